use thiserror::Error;

/// Errors raised by the placement engines and the data model they operate on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("resource arithmetic invariant violated: {0}")]
    Invariant(String),

    #[error("placement violates capacity on host '{host}': {axis} over by {over}")]
    CapacityExceeded {
        host: String,
        axis: &'static str,
        over: u64,
    },

    #[error("no suitable host found for instance {instance_id} during initial placement")]
    NoSuitableHost { instance_id: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown engine kind '{0}'")]
    UnknownEngine(String),

    #[error("engine precondition not met: {0}")]
    Precondition(String),
}

impl CoreError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn capacity_exceeded(host: impl Into<String>, axis: &'static str, over: u64) -> Self {
        Self::CapacityExceeded {
            host: host.into(),
            axis,
            over,
        }
    }

    pub fn no_suitable_host(instance_id: u64) -> Self {
        Self::NoSuitableHost { instance_id }
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn unknown_engine(name: impl Into<String>) -> Self {
        Self::UnknownEngine(name.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}
