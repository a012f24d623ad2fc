use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: i64 },

    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    #[error("corrupt block: {0}")]
    CorruptBlock(String),

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("record codec error: {0}")]
    Record(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}
