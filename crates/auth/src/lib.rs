//! `anime-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: methods and paths
//! are plain strings, principals come from verified token claims.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod policy;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenIssueError, issue_hs256};
pub use policy::{AccessPolicy, AccessRule, Requirement};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
