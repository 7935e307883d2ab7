use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("unsupported on this backend: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, HwError>;
