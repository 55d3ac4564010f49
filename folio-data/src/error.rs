use folio_core::ConfigError;

/// Errors that can occur in the data layer.
///
/// Malformed paging input is clamped rather than reported, and unknown
/// sort fields are dropped, so these variants are limited to contract
/// violations, unparseable input and failures of the external executor.
#[derive(Debug)]
pub enum DataError {
    /// An operation that requires a pageable was called without one.
    /// Carries the name of the operation.
    MissingPageable(&'static str),
    /// An identifier failed validation under a checking identifier policy.
    InvalidIdentifier { kind: &'static str, ident: String },
    /// A sort direction other than `asc`/`desc`.
    InvalidSortDirection(String),
    /// A typed configuration section could not be read.
    Config(ConfigError),
    /// An error raised by the external query executor.
    Executor(Box<dyn std::error::Error + Send + Sync>),
}

impl DataError {
    /// Construct an `Executor` variant from any error type.
    ///
    /// Used by executor implementations to wrap driver-specific errors.
    pub fn executor(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Executor(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::MissingPageable(op) => write!(f, "{op} requires a pageable"),
            DataError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            DataError::InvalidSortDirection(dir) => {
                write!(f, "Invalid sort direction '{dir}': expected asc or desc")
            }
            DataError::Config(err) => write!(f, "Data config error: {err}"),
            DataError::Executor(err) => write!(f, "Executor error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Config(err) => Some(err),
            DataError::Executor(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ConfigError> for DataError {
    fn from(err: ConfigError) -> Self {
        DataError::Config(err)
    }
}
