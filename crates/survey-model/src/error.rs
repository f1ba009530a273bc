use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("duplicate metadata record for attribute '{attribute}'")]
    DuplicateAttribute { attribute: String },
    #[error("sentinel code '{token}' of attribute '{attribute}' is not numeric")]
    NonNumericSentinel { attribute: String, token: String },
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
