/// Tracing subscriber setup
///
/// Events go to the console (compact or JSON, per `log.format`) and, when
/// `log.file_enabled` is set, to `<runtime_root>/<log.dir>/YYYY-MM-DD.log`.
/// The file switches at UTC midnight and is written from a background
/// thread. `RUST_LOG` overrides `log.level`.

use crate::config::{Config, LogFormat};
use std::path::Path;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Installs the global tracing subscriber
///
/// The returned guard flushes the log file when dropped; hold it for the
/// life of the process.
pub fn init(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log.level))?;

    let console_layer = match config.log.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    let (file_layer, guard) = if config.log.file_enabled {
        let (writer, guard) = tracing_appender::non_blocking(daily_file(&config.log_dir())?);
        let layer = fmt::layer().with_ansi(false).with_target(true).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

/// Appender writing `dir/YYYY-MM-DD.log`, one file per day
pub fn daily_file(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;

    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_suffix("log")
        .build(dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_writes_to_todays_file() {
        let dir = std::env::temp_dir().join(format!("quillpress-log-{}", std::process::id()));
        let mut appender = daily_file(&dir).unwrap();

        appender.write_all(b"first line\n").unwrap();
        appender.flush().unwrap();

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let path = dir.join(format!("{}.log", today));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first line\n");

        std::fs::remove_dir_all(&dir).ok();
    }
}
