use std::path::PathBuf;
use std::sync::{Mutex, Once};

use tracing::Level;
use tracing_subscriber::{
    filter::{Directive, LevelFilter},
    fmt::format::FmtSpan,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Applied unless `RUST_LOG` is set, so hub client chatter stays below the run's output
const HUB_DIRECTIVE: &str = "hf_hub=warn";

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include source code locations
    pub source_location: bool,
    /// Whether to log span open/close events
    pub log_spans: bool,
    /// Output file path; stderr when unset, stdout stays reserved for generated text
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            timestamps: true,
            source_location: false,
            log_spans: false,
            file_path: None,
        }
    }
}

/// Initialize logging system. Only the first call installs a subscriber.
pub fn setup_logging(config: LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

/// `rust_log` directives win over `level`; without them only `hf_hub` is capped.
fn env_filter(level: Level, rust_log: Option<&str>) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::from_level(level).into());
    match rust_log.map(str::trim).filter(|directives| !directives.is_empty()) {
        Some(directives) => builder.parse_lossy(directives),
        None => {
            let filter = builder.parse_lossy("");
            match HUB_DIRECTIVE.parse::<Directive>() {
                Ok(directive) => filter.add_directive(directive),
                Err(_) => filter,
            }
        }
    }
}

fn setup_logging_internal(config: LogConfig) -> Result<(), String> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(config.level, rust_log.as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location)
        .with_span_events(if config.log_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .with_ansi(config.file_path.is_none());

    match (config.file_path, config.timestamps) {
        (Some(path), timestamps) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?;
            let builder = builder.with_writer(Mutex::new(file));
            if timestamps {
                builder.try_init()
            } else {
                builder.without_time().try_init()
            }
        }
        (None, true) => builder.with_writer(std::io::stderr).try_init(),
        (None, false) => builder.with_writer(std::io::stderr).without_time().try_init(),
    }
    .map_err(|e| format!("Failed to set global subscriber: {}", e))
}
