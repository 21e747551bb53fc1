use colored::Colorize;
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// Install the colored logger. Lines from threads other than main (the timeout timer)
/// carry the thread name so correction logs can be told apart from walk logs.
pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // Default: only warnings from dependencies
        .filter_module(env!("CARGO_PKG_NAME"), level) // Our crate: use requested level
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let thread = std::thread::current();
            let origin = match thread.name() {
                Some("main") | None => String::new(),
                Some(t) => format!(" ({t})"),
            };
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let path = record.target().to_string().white();
                    format!(
                        "[{} {} {}{}] {}",
                        name.cyan(),
                        level_str,
                        path,
                        origin.dimmed(),
                        record.args()
                    )
                }
                _ => format!("[{}{}] {}", name.cyan(), origin.dimmed(), record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
