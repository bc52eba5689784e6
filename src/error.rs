use thiserror::Error;

/// Internal failure modes. This never reaches the public API directly —
/// `Engine::set_cell`/`copy_rect`/`load`/`save` log the reason (see the
/// `log::warn!` call sites in `engine.rs`/`serializer.rs`) and collapse it
/// to `bool`, per the crate's external interface contract.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("could not parse formula: {0}")]
    ParseFailure(String),

    #[error("malformed record in saved sheet: {0}")]
    MalformedRecord(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
