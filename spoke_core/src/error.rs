use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SpokeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("event queue closed")]
    QueueClosed,
    #[error("sink error: {0}")]
    Sink(String),
    #[error("task {0} panicked")]
    TaskPanicked(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("no sink to dispatch events to")]
    MissingSink,
    #[error("no sensor sources configured")]
    NoSources,
    #[error("duplicate source id {0}")]
    DuplicateSource(u8),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
