use thiserror::Error;

/// Errors emitted while building values from a schema.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// `required()` placeholders left in the merged schema, including ones
    /// produced by lazy fields, reported together.
    #[error("[factoria] missing required build arguments: {}", .paths.join(", "))]
    MissingRequiredArgument { paths: Vec<String> },
    /// `derived()` placeholders were not filled in by the post-build transform.
    #[error("[factoria] missing derived values: {}", .paths.join(", "))]
    MissingDerivedValue { paths: Vec<String> },
    /// A pending value was reached while building synchronously.
    #[error("[factoria] pending value encountered during build_sync for key {path}")]
    PendingValue { path: String },
    #[error("[factoria] build_sync does not support pending defaults")]
    PendingDefaults,
    #[error("[factoria] build_sync does not support pending overrides")]
    PendingOverrides,
    #[error("[factoria] build_sync does not support transforms returning pending values")]
    PendingTransform,
    /// A synchronous build yielded instead of completing.
    #[error("[factoria] build_sync suspended on pending work")]
    Suspended,
    #[error("[factoria] iteration counter overflow: cannot claim {count} iterations from {current}")]
    CounterOverflow { current: u64, count: u64 },
    #[error("[factoria] invalid schema: {0}")]
    InvalidSchema(String),
    #[error("[factoria] built value does not match the requested type: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Result type for factory operations.
pub type Result<T> = std::result::Result<T, FactoryError>;
