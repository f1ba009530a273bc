//! Value normalization stages.
//!
//! - **sentinel**: token rewriting and type coercion for mixed-encoding attributes
//! - **missing**: metadata-driven sentinel-code replacement

pub mod missing;
pub mod sentinel;

pub use missing::{MissingCodeResolver, MissingCodes};
pub use sentinel::SentinelNormalizer;
