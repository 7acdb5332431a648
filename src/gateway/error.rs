//! Gateway operation errors.

use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// No registered domain has this name.
    #[error("domain not found: {0}")]
    NotFound(String),

    /// Any registry failure, including audit writes.
    #[error(transparent)]
    Upstream(#[from] RegistryError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
