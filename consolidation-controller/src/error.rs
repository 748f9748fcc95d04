use thiserror::Error;

/// Errors raised by the inventory source adapters. Grounded on
/// `core-engine/src/error.rs`'s thiserror-plus-constructor-helpers shape.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("inventory source unavailable: {0}")]
    Unavailable(String),

    #[error("inventory source returned malformed data: {0}")]
    Malformed(String),
}

impl InventoryError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Dispatch errors from the compute action API, carrying the three
/// distinguished kinds spec.md section 6 names plus a catch-all. The three
/// named kinds are recovered locally by the control loop; `Other` aborts
/// the remainder of the tick.
#[derive(Error, Debug)]
pub enum ComputeApiError {
    #[error("instance {instance_id} is not in a valid state for migration")]
    InstanceInvalidState { instance_id: u64 },

    #[error("instance {instance_id} was not found")]
    InstanceNotFound { instance_id: u64 },

    #[error("migration pre-check failed for instance {instance_id}: {reason}")]
    MigrationPreCheckError { instance_id: u64, reason: String },

    #[error("compute API call failed: {0}")]
    Other(String),
}

/// Configuration errors are fatal at startup (spec.md section 7).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Core(#[from] consolidation_core::CoreError),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Top-level error for a single control-loop tick.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("failed to build snapshot: {0}")]
    Snapshot(#[from] InventoryError),

    #[error(transparent)]
    Engine(#[from] consolidation_core::CoreError),

    #[error("dispatch aborted: {0}")]
    Dispatch(#[from] ComputeApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
