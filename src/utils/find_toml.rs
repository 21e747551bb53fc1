//! Load `.adaptfind.toml` from a directory (CLI only). Lib does not use this; the consuming
//! program builds [`FindOpts`](crate::FindOpts) itself.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::correction::{
    CommandCollaborator, Correction, CorrectionPolicy, TimeoutFallback,
};
use crate::utils::config::PackagePaths;
use crate::{DirOrder, Opts, OutputFormat, SymlinkPolicy};

#[derive(Debug, Deserialize)]
pub(crate) struct FindToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
struct Settings {
    name: Option<String>,
    symlinks: Option<SymlinkPolicy>,
    order: Option<DirOrder>,
    /// Seconds, fractional allowed.
    timeout: Option<f64>,
    max_depth: Option<i64>,
    on_timeout: Option<TimeoutFallback>,
    correct_depth: Option<i64>,
    ask_cmd: Option<String>,
    skip_when_matched: Option<bool>,
    strict: Option<bool>,
    output: Option<String>,
    json: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if missing or unreadable.
pub(crate) fn load_find_toml(dir: &Path) -> Option<FindToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($src:expr, $dst:expr, $src_field:ident => $dst_field:ident) => {
        if let Some(v) = $src.$src_field {
            $dst.$dst_field = v;
        }
    };
}

/// Collaborator from a command line like `my-agent --model small`. No shell is involved.
pub(crate) fn command_collaborator(cmdline: &str) -> Option<CommandCollaborator> {
    let mut words = cmdline.split_whitespace();
    let program = words.next()?;
    Some(words.fold(CommandCollaborator::new(program), |c, a| c.arg(a)))
}

/// Correction policy from the three mutually exclusive knobs. `ask_cmd` wins, then
/// `correct_depth`, then `on_timeout`.
pub(crate) fn correction_from(
    ask_cmd: Option<&str>,
    correct_depth: Option<i64>,
    on_timeout: Option<TimeoutFallback>,
) -> Option<CorrectionPolicy> {
    let set = [ask_cmd.is_some(), correct_depth.is_some(), on_timeout.is_some()];
    if set.iter().filter(|&&s| s).count() > 1 {
        log::warn!(
            "ask_cmd, correct_depth and on_timeout are exclusive; using the first one set"
        );
    }
    if let Some(cmdline) = ask_cmd {
        match command_collaborator(cmdline) {
            Some(c) => return Some(CorrectionPolicy::reactive(c)),
            None => log::warn!("ignoring empty ask_cmd"),
        }
    }
    if let Some(n) = correct_depth {
        return Some(CorrectionPolicy::PreDeclared(Correction::SetMaxDepth(n)));
    }
    on_timeout.map(|fallback| CorrectionPolicy::None { fallback })
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &FindToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref n) = s.name {
        opts.find.name = Some(n.clone());
    }
    apply_file_opt!(s, opts.find, symlinks => symlinks);
    apply_file_opt!(s, opts.find, order => order);
    apply_file_opt!(s, opts.find, max_depth => max_depth);
    apply_file_opt!(s, opts.find, skip_when_matched => skip_when_matched);
    apply_file_opt!(s, opts.find, strict => strict);
    if let Some(secs) = s.timeout {
        match Duration::try_from_secs_f64(secs) {
            Ok(d) => opts.find.timeout = Some(d),
            Err(e) => log::warn!("ignoring timeout = {secs} from config: {e}"),
        }
    }
    if let Some(policy) = correction_from(s.ask_cmd.as_deref(), s.correct_depth, s.on_timeout) {
        opts.find.correction = policy;
    }
    if let Some(ref p) = s.output {
        opts.output = Some(PathBuf::from(p));
    }
    if let Some(json) = s.json {
        opts.format = if json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Plain
        };
    }
}
