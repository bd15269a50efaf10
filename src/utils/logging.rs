use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Initialize the logger with custom formatting.
///
/// Noisy dependency targets are capped at `warn` unless trace logging was asked for.
pub fn init_logger(level: LevelFilter) {
    let dependency_level = if level == LevelFilter::Trace {
        LevelFilter::Trace
    } else {
        level.min(LevelFilter::Warn)
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, level)
        .filter(Some("hyper"), dependency_level)
        .filter(Some("reqwest"), dependency_level)
        .filter(Some("actix_server"), dependency_level)
        .init();
}

/// Get log level from string
pub fn get_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_levels_case_insensitively() {
        assert_eq!(get_log_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(get_log_level(" warning "), LevelFilter::Warn);
        assert_eq!(get_log_level("off"), LevelFilter::Off);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(get_log_level("loud"), LevelFilter::Info);
    }
}
