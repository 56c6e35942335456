use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "sensitivity.log";
/// Log files above this size are truncated before a run (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Most recent bytes kept on truncation (1 MB)
const KEEP_SIZE: u64 = 1024 * 1024;

/// Trim an oversized log down to its last `KEEP_SIZE` bytes, starting at a
/// line boundary.
fn truncate_log(log_path: &Path) -> std::io::Result<()> {
    let Ok(metadata) = fs::metadata(log_path) else {
        return Ok(());
    };
    if metadata.len() <= MAX_LOG_SIZE {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    file.seek(SeekFrom::Start(metadata.len().saturating_sub(KEEP_SIZE)))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    drop(file);

    let skip = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- log truncated ---\n")?;
    file.write_all(&tail[skip..])?;
    Ok(())
}

/// Install the global subscriber.
///
/// Human-readable output goes to stderr so stdout stays free for the report.
/// With `log_dir` set, records are also appended to
/// `{log_dir}/sensitivity.log` through a background writer; keep the returned
/// guard alive until exit so buffered lines are flushed. `RUST_LOG`
/// overrides `level` when set.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> color_eyre::Result<Option<WorkerGuard>> {
    let default_filter = format!("sensitivity={level},sensitivity_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            if let Err(e) = truncate_log(&dir.join(LOG_FILE_NAME)) {
                eprintln!("Warning: failed to truncate log file: {e}");
            }
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!(log_dir = ?log_dir, "logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_log_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "one\ntwo\n").unwrap();

        truncate_log(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_missing_log_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(truncate_log(&dir.path().join(LOG_FILE_NAME)).is_ok());
    }

    #[test]
    fn test_large_log_keeps_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let line = "x".repeat(99) + "\n";
        let n_lines = (MAX_LOG_SIZE / 100 + 10) as usize;
        fs::write(&path, line.repeat(n_lines)).unwrap();

        truncate_log(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("--- log truncated ---\n"));
        assert!(content.len() as u64 <= KEEP_SIZE + 64);
        assert!(content.lines().skip(1).all(|l| l.len() == 99));
    }
}
