use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    MissingRole(String),
}

/// Authorize a principal against a required role.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Role) -> Result<(), AuthzError> {
    if principal.has_role(required) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole(required.name().to_string()))
    }
}
