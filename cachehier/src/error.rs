/// Errors raised while validating a hierarchy configuration
///
/// All of these are detected before the first reference is processed; a simulation never fails
/// part way through
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("unknown {kind} `{value}`")]
    UnknownPolicy { kind: &'static str, value: String },
}

/// Errors raised while reading a trace
#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("malformed trace line {line}: `{content}`")]
    Malformed { line: usize, content: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trace(#[from] TraceError),
}
