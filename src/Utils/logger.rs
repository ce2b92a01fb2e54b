use crate::arithmetic::errors::SettingsError;
use chrono::Local;
use log::info;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};

/// "debug", "info", "warn", "error" or "off"/"none"; no level means info
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter, SettingsError> {
    let Some(level) = loglevel else {
        return Ok(LevelFilter::Info);
    };
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(SettingsError::InvalidValue {
            key: "loglevel".to_string(),
            value: level.to_string(),
        }),
    }
}

/// Terminal logger for the whole process. A second call keeps the first logger.
pub fn init_logger(loglevel: Option<&str>) -> Result<(), SettingsError> {
    let log_option = level_filter(loglevel)?;
    if log_option == LevelFilter::Off {
        return Ok(());
    }
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    if logger_instance.is_ok() {
        info!("logging started with level {}", log_option);
    }
    Ok(())
}

/// Terminal logger plus a copy of every record in `dir/log_<date>_<time>.txt`.
/// Returns the path of the log file.
pub fn init_logger_with_file<P: AsRef<Path>>(
    loglevel: Option<&str>,
    dir: P,
) -> Result<PathBuf, SettingsError> {
    let log_option = level_filter(loglevel)?;
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.as_ref().join(format!("log_{}.txt", date_and_time));
    let file = File::create(&path)?;
    let logger_instance = CombinedLogger::init(vec![
        TermLogger::new(
            log_option,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(log_option, Config::default(), file),
    ]);
    if logger_instance.is_ok() {
        info!("logging to {}", path.display());
    }
    Ok(path)
}
