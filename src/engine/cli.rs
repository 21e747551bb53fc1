//! CLI command handler: merge config file and flags, run, map the summary to an exit code.

use anyhow::{Context, Result};
use log::debug;
use std::process::ExitCode;
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::pipeline::sink::WriterSink;
use crate::utils::find_toml::{apply_file_to_opts, correction_from, load_find_toml};
use crate::utils::setup_logging;
use crate::{DirOrder, Opts, OutputFormat, RunSummary, SymlinkPolicy};

/// Defaults, then `.adaptfind.toml` from the working directory, then flags.
fn setup_opts(cli: &Cli) -> Result<Opts> {
    let verbose = cli.verbose.unwrap_or(false);
    setup_logging(verbose);

    let mut opts = Opts {
        verbose,
        ..Default::default()
    };
    if let Some(file) = load_find_toml(std::path::Path::new(".")) {
        debug!("Applying config file");
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts)?;
    Ok(opts)
}

/// Overwrite opts with every flag given on the command line.
fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) -> Result<()> {
    if cli.follow_all {
        opts.find.symlinks = SymlinkPolicy::Always;
    } else if cli.follow_cmdline {
        opts.find.symlinks = SymlinkPolicy::IfFlag;
    } else if cli.never_follow {
        opts.find.symlinks = SymlinkPolicy::Never;
    }
    if cli.dirs_first {
        opts.find.order = DirOrder::Pre;
    }
    if let Some(ref n) = cli.name {
        opts.find.name = Some(n.clone());
    }
    if let Some(secs) = cli.timeout {
        let d = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid --timeout {secs}"))?;
        opts.find.timeout = Some(d);
    }
    if let Some(d) = cli.max_depth {
        opts.find.max_depth = d;
    }
    if let Some(policy) = correction_from(
        cli.ask_cmd.as_deref(),
        cli.correct_depth,
        cli.on_timeout.map(Into::into),
    ) {
        opts.find.correction = policy;
    }
    if let Some(v) = cli.skip_when_matched {
        opts.find.skip_when_matched = v;
    }
    if let Some(v) = cli.strict {
        opts.find.strict = v;
    }
    if let Some(ref p) = cli.output {
        opts.output = Some(p.clone());
    }
    if let Some(json) = cli.json {
        opts.format = if json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Plain
        };
    }
    Ok(())
}

/// Run the search. Exit status is 1 when a root was missing, a directory was skipped or a
/// timeout correction was rejected; finding nothing is still success.
pub fn handle_run(cli: &Cli) -> Result<ExitCode> {
    let opts = setup_opts(cli)?;
    let summary: RunSummary = match &opts.output {
        Some(path) => {
            let mut sink = WriterSink::create(path, opts.format)?;
            crate::find(&cli.folders, &opts.find, &mut sink)?
        }
        None => {
            let mut sink = WriterSink::stdout(opts.format);
            crate::find(&cli.folders, &opts.find, &mut sink)?
        }
    };
    debug!(
        "{} matches, timed out: {}, final depth bound: {}",
        summary.matched, summary.timed_out, summary.final_max_depth
    );
    Ok(if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
