pub mod error;
pub mod rates;
pub mod taxation;
pub mod types;

#[cfg(feature = "pipeline")]
pub mod pipeline;

#[cfg(feature = "optimizer")]
pub mod optimizer;

pub use error::SasuError;
pub use types::*;

/// Standard result type for all SASU fiscal operations
pub type SasuResult<T> = Result<T, SasuError>;
