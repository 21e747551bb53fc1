use adaptfind::engine::{NameFilter, base_name, expand_home_with, resolve_root};
use adaptfind::pipeline::{TraversalContext, handle_timeout, parse_instruction, start_timer};
use adaptfind::{
    Correction, CorrectionError, CorrectionPolicy, Match, NullaryFn, OutputFormat,
    PromptFn, Sink, TimeoutFallback, TimeoutOutcome, WriterSink,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

// --- NameFilter ---

#[test]
fn test_filter_none_matches_everything() {
    let f = NameFilter::new(None).unwrap();
    assert!(f.is_match(Path::new("/a/b/anything")));
    assert!(f.is_match(Path::new("/")));
}

#[test]
fn test_filter_star_matches_base_name_only() {
    let f = NameFilter::new(Some("*.txt")).unwrap();
    assert!(f.is_match(Path::new("/x/y/a.txt")));
    assert!(f.is_match(Path::new("/x/dir.txt")));
    assert!(!f.is_match(Path::new("/x/dir.txt/a.md")));
}

#[test]
fn test_filter_substring_pattern() {
    let f = NameFilter::new(Some("*mlsys*")).unwrap();
    assert!(f.is_match(Path::new("/x/mlsys_report.txt")));
    assert!(!f.is_match(Path::new("/x/other.txt")));
    assert!(!f.is_match(Path::new("/mlsys/other.txt")));
}

#[test]
fn test_filter_is_case_sensitive() {
    let f = NameFilter::new(Some("*.TXT")).unwrap();
    assert!(!f.is_match(Path::new("/x/a.txt")));
    assert!(f.is_match(Path::new("/x/a.TXT")));
}

#[test]
fn test_filter_question_and_class() {
    let f = NameFilter::new(Some("file?.[ch]")).unwrap();
    assert!(f.is_match(Path::new("file1.c")));
    assert!(f.is_match(Path::new("fileX.h")));
    assert!(!f.is_match(Path::new("file10.c")));
    assert!(!f.is_match(Path::new("file1.o")));
}

#[test]
fn test_filter_invalid_pattern_errors() {
    assert!(NameFilter::new(Some("[unclosed")).is_err());
}

#[test]
fn test_base_name_of_root_is_whole_path() {
    assert_eq!(base_name(Path::new("/")), Path::new("/").as_os_str());
    assert_eq!(base_name(Path::new("/a/b")), "b");
}

// --- expand_home / resolve_root ---

#[test]
fn test_expand_home_tilde_alone() {
    let home = PathBuf::from("/home/u");
    assert_eq!(expand_home_with(Path::new("~"), Some(home.as_path())), home);
}

#[test]
fn test_expand_home_tilde_prefix() {
    let home = PathBuf::from("/home/u");
    assert_eq!(
        expand_home_with(Path::new("~/docs/x"), Some(home.as_path())),
        PathBuf::from("/home/u/docs/x")
    );
}

#[test]
fn test_expand_home_leaves_other_paths() {
    let home = PathBuf::from("/home/u");
    assert_eq!(
        expand_home_with(Path::new("~other/x"), Some(home.as_path())),
        PathBuf::from("~other/x")
    );
    assert_eq!(
        expand_home_with(Path::new("/abs/~"), Some(home.as_path())),
        PathBuf::from("/abs/~")
    );
    assert_eq!(expand_home_with(Path::new("~"), None), PathBuf::from("~"));
}

#[test]
fn test_resolve_root_is_absolute_and_normalized() {
    let tmp = tempfile::tempdir().unwrap();
    let base = tmp.path().canonicalize().unwrap();
    std::fs::create_dir(base.join("d")).unwrap();
    let via_dotdot = base.join("d").join("..").join("d");
    assert_eq!(resolve_root(&via_dotdot).unwrap(), base.join("d"));
    assert_eq!(resolve_root(&base.join("d").join(".")).unwrap(), base.join("d"));
}

#[test]
fn test_resolve_root_missing_parent_errors() {
    assert!(resolve_root(Path::new("/definitely/not/here/x")).is_err());
}

// --- parse_instruction ---

#[test]
fn test_parse_phrases() {
    for text in [
        "set depth to 3",
        "Set Depth Bound To 3",
        "set max depth to 3",
        "  set search depth to 3  ",
    ] {
        assert_eq!(parse_instruction(text), Ok(Correction::SetMaxDepth(3)), "{text}");
    }
}

#[test]
fn test_parse_call_and_assignment_forms() {
    assert_eq!(
        parse_instruction("set_search_depth(0)"),
        Ok(Correction::SetMaxDepth(0))
    );
    assert_eq!(
        parse_instruction("set_max_depth( -1 );"),
        Ok(Correction::SetMaxDepth(-1))
    );
    assert_eq!(
        parse_instruction("find_context.max_depth=5"),
        Ok(Correction::SetMaxDepth(5))
    );
    assert_eq!(
        parse_instruction("search_depth = 2"),
        Ok(Correction::SetMaxDepth(2))
    );
}

#[test]
fn test_parse_code_fence_tolerated() {
    assert_eq!(
        parse_instruction("```python\nfind_context.max_depth = 0\n```"),
        Ok(Correction::SetMaxDepth(0))
    );
    assert!(parse_instruction("```\nmax_depth = 0").is_err());
}

#[test]
fn test_parse_rejects_everything_else() {
    for text in [
        "",
        "import os; os.system('rm -rf ~')",
        "max_depth = 3\nimport os",
        "set depth to three",
        "set depth to 3 and delete everything",
        "max_depth == 3",
        "other_var = 3",
        "set_search_depth(3); exec('x')",
        "print('set depth to 3')",
    ] {
        match parse_instruction(text) {
            Err(CorrectionError::InvalidInstruction { text: t }) => assert_eq!(t, text),
            other => panic!("{text:?} parsed as {other:?}"),
        }
    }
}

#[test]
fn test_correction_from_str_and_display() {
    let c: Correction = "set depth to 4".parse().unwrap();
    assert_eq!(c.to_string(), "set depth to 4");
}

// --- TraversalContext ---

#[test]
fn test_context_unlimited_descends() {
    let ctx = TraversalContext::new(-1);
    assert!(ctx.may_descend(0));
    assert!(ctx.may_descend(10_000));
}

#[test]
fn test_context_bound_checked_live() {
    let ctx = TraversalContext::new(2);
    assert!(ctx.may_descend(1));
    assert!(!ctx.may_descend(2));
    ctx.set_max_depth(0);
    assert!(!ctx.may_descend(0));
    ctx.set_max_depth(5);
    assert!(ctx.may_descend(4));
}

#[test]
fn test_context_written_from_another_thread() {
    let ctx = Arc::new(TraversalContext::new(-1));
    let ctx_t = Arc::clone(&ctx);
    thread::spawn(move || ctx_t.set_max_depth(1)).join().unwrap();
    assert_eq!(ctx.max_depth(), 1);
}

// --- timer ---

#[test]
fn test_timer_cancel_before_fire_never_runs() {
    let ran = Arc::new(AtomicBool::new(false));
    let ran_t = Arc::clone(&ran);
    let mut t = start_timer(Duration::from_secs(30), move || {
        ran_t.store(true, Ordering::SeqCst);
    })
    .unwrap();
    t.cancel();
    assert!(t.join().is_none());
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_timer_fires_once_and_cancel_after_is_noop() {
    let mut t = start_timer(Duration::from_millis(10), || 42).unwrap();
    thread::sleep(Duration::from_millis(300));
    assert!(t.has_fired());
    t.cancel();
    t.cancel();
    assert_eq!(t.join(), Some(42));
}

#[test]
fn test_timer_drop_cancels() {
    let ran = Arc::new(AtomicBool::new(false));
    let ran_t = Arc::clone(&ran);
    let t = start_timer(Duration::from_millis(200), move || {
        ran_t.store(true, Ordering::SeqCst);
    })
    .unwrap();
    drop(t);
    thread::sleep(Duration::from_millis(400));
    assert!(!ran.load(Ordering::SeqCst));
}

// --- handle_timeout ---

#[test]
fn test_timeout_warn_leaves_bound() {
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::None {
        fallback: TimeoutFallback::Warn,
    };
    assert_eq!(
        handle_timeout(&ctx, &policy, false),
        Ok(TimeoutOutcome::NoAction)
    );
    assert_eq!(ctx.max_depth(), -1);
    assert!(ctx.timeout_occurred());
}

#[test]
fn test_timeout_zero_depth_fallback() {
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::None {
        fallback: TimeoutFallback::ZeroDepth,
    };
    assert_eq!(
        handle_timeout(&ctx, &policy, false),
        Ok(TimeoutOutcome::Applied(Correction::SetMaxDepth(0)))
    );
    assert_eq!(ctx.max_depth(), 0);
}

#[test]
fn test_timeout_predeclared_applied_verbatim() {
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::PreDeclared(Correction::SetMaxDepth(5));
    assert_eq!(
        handle_timeout(&ctx, &policy, true),
        Ok(TimeoutOutcome::Applied(Correction::SetMaxDepth(5)))
    );
    assert_eq!(ctx.max_depth(), 5);
}

#[test]
fn test_timeout_reactive_gets_fixed_prompt() {
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::reactive(PromptFn::new(|prompt: &str| {
        assert_eq!(
            prompt,
            "A timeout event has occurred, please take appropriate action."
        );
        Ok("set depth to 2".to_string())
    }));
    assert_eq!(
        handle_timeout(&ctx, &policy, false),
        Ok(TimeoutOutcome::Applied(Correction::SetMaxDepth(2)))
    );
    assert_eq!(ctx.max_depth(), 2);
}

#[test]
fn test_timeout_reactive_nullary() {
    let ctx = TraversalContext::new(-1);
    let policy =
        CorrectionPolicy::reactive(NullaryFn::new(|| Ok("set_search_depth(1)".to_string())));
    assert_eq!(
        handle_timeout(&ctx, &policy, false),
        Ok(TimeoutOutcome::Applied(Correction::SetMaxDepth(1)))
    );
}

#[test]
fn test_timeout_reactive_rejects_unknown_instruction() {
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::reactive(NullaryFn::new(|| {
        Ok("__import__('os').remove('x')".to_string())
    }));
    let res = handle_timeout(&ctx, &policy, false);
    assert!(matches!(res, Err(CorrectionError::InvalidInstruction { .. })));
    assert_eq!(ctx.max_depth(), -1);
}

#[test]
fn test_timeout_reactive_collaborator_failure() {
    let ctx = TraversalContext::new(3);
    let policy = CorrectionPolicy::reactive(NullaryFn::new(|| anyhow::bail!("no route to host")));
    let res = handle_timeout(&ctx, &policy, false);
    assert!(matches!(res, Err(CorrectionError::Collaborator { .. })));
    assert_eq!(ctx.max_depth(), 3);
}

#[cfg(unix)]
#[test]
fn test_command_collaborator_reads_prompt_and_replies() {
    use adaptfind::{Collaborator, CommandCollaborator};

    let echo = CommandCollaborator::new("sh")
        .arg("-c")
        .arg("read line; case \"$line\" in *timeout*) echo 'max_depth = 4';; esac");
    let ctx = TraversalContext::new(-1);
    let policy = CorrectionPolicy::reactive(echo.clone());
    assert_eq!(
        handle_timeout(&ctx, &policy, false),
        Ok(TimeoutOutcome::Applied(Correction::SetMaxDepth(4)))
    );

    let failing = CommandCollaborator::new("sh").arg("-c").arg("exit 3");
    assert!(failing.ask(None).is_err());
}

// --- sinks ---

#[test]
fn test_writer_sink_plain_lines() {
    let mut buf = Vec::new();
    {
        let mut sink = WriterSink::new(&mut buf, OutputFormat::Plain);
        sink.record(&Match {
            path: PathBuf::from("/a"),
            is_dir: true,
        })
        .unwrap();
        sink.record(&Match {
            path: PathBuf::from("/a/b.txt"),
            is_dir: false,
        })
        .unwrap();
        sink.finish().unwrap();
    }
    assert_eq!(String::from_utf8(buf).unwrap(), "/a\n/a/b.txt\n");
}

#[test]
fn test_writer_sink_json_lines() {
    let mut buf = Vec::new();
    {
        let mut sink = WriterSink::new(&mut buf, OutputFormat::JsonLines);
        sink.record(&Match {
            path: PathBuf::from("/a/b.txt"),
            is_dir: false,
        })
        .unwrap();
        sink.finish().unwrap();
    }
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "{\"path\":\"/a/b.txt\",\"is_dir\":false}\n"
    );
}
