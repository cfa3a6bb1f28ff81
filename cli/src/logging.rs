use flexi_logger::{FileSpec, Logger, LoggerHandle};
use lodgebook_core::settings::Settings;

/// Start file logging when a log directory is configured. The handle
/// must stay alive for the whole session; dropping it stops the logger.
/// Nothing is ever logged to the console itself.
pub fn init(settings: &Settings) -> Result<Option<LoggerHandle>, String> {
    let dir = match &settings.log_dir {
        None => return Ok(None),
        Some(dir) => dir,
    };
    let handle = Logger::try_with_str(&settings.log_level)
        .map_err(|e| format!("invalid log level '{}': {}", settings.log_level, e))?
        .log_to_file(FileSpec::default().directory(dir).basename("lodgebook"))
        .start()
        .map_err(|e| format!("cannot start logger: {}", e))?;
    Ok(Some(handle))
}
