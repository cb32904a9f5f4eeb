use thiserror::Error;

/// Raised while assembling a model or simulation state from user-supplied
/// configuration, before any simulation step has run.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("unrecognized option `{0}`")]
    UnrecognizedOption(String),

    #[error("process `{0}` references entity {1} but the model has no other process producing it")]
    DanglingEntity(&'static str, crate::point::EntityId),

    #[error("a model cannot be modified after finalize()")]
    AlreadyFinalized,
}

/// Raised while parsing an external point file.
#[derive(Debug, Error)]
pub enum InputFormatError {
    #[error("malformed record on line {line}: {detail}")]
    MalformedRecord { line: usize, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A condition that should be unreachable under correct bookkeeping. Carries
/// enough state to diagnose which invariant broke; never part of normal
/// control flow.
#[derive(Debug, Error)]
#[error("invariant violated in {location}: {detail}")]
pub struct InvariantViolation {
    pub location: &'static str,
    pub detail: String,
}

impl InvariantViolation {
    pub fn new(location: &'static str, detail: impl Into<String>) -> Self {
        InvariantViolation {
            location,
            detail: detail.into(),
        }
    }
}

/// Top-level error type propagated out of `ppsim-core`.
///
/// `HaltCondition` deliberately has no variant here: a halt is a normal
/// termination outcome carried on `Simulator`, not a failure.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InputFormat(#[from] InputFormatError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

pub type Result<T> = std::result::Result<T, SimError>;
