use crate::EPOCH;
use anyhow::Result;
use log::{Level, LevelFilter, log};
use std::fs;
use std::path::Path;

/// Sets up `fern` + `log` exactly the way the teacher's `init_logger` does:
/// same elapsed-time/thread-name prefix, writing to both stdout and a log
/// file (spec.md §4.8 ambient stack — logging).
pub fn init_logger(level_filter: LevelFilter, log_file_path: &Path) -> Result<()> {
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let _ = fs::remove_file(log_file_path);

    fern::Dispatch::new()
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{:<25}{}", prefix, message))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .chain(fern::log_file(log_file_path)?)
        .apply()?;

    log!(Level::Info, "[MAIN] logger initialized");
    Ok(())
}
