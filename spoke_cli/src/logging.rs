//! Tracing setup: console on stderr (stdout carries the event stream) plus
//! an optional JSON-lines file.

use crate::cli::FILE_GUARD;
use std::path::Path;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn env_or(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn init(json: bool, level: &str, file_cfg: Option<&spoke_config::Logging>) -> eyre::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let console: BoxedLayer = if json {
        console.json().with_filter(env_or(level)).boxed()
    } else {
        console.with_filter(env_or(level)).boxed()
    };
    layers.push(console);

    if let Some(cfg) = file_cfg
        && let Some(file) = cfg.file.as_deref()
    {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file must name a file, got {file:?}"))?;
        let appender = match cfg.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let file_level = cfg.level.as_deref().unwrap_or(level);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(file_level))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("installing tracing subscriber: {e}"))
}
