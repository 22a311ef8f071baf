use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque strings. A Spring-style `ROLE_` prefix is accepted and ignored
/// when comparing, so `ROLE_ADMIN` and `ADMIN` are the same role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Full write access. Implies [`Role::USER`].
    pub const ADMIN: Role = Role(Cow::Borrowed("ADMIN"));

    /// Read access.
    pub const USER: Role = Role(Cow::Borrowed("USER"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Role name without the optional `ROLE_` prefix.
    pub fn name(&self) -> &str {
        self.0.strip_prefix("ROLE_").unwrap_or(&self.0)
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    pub fn implies(&self, required: &Role) -> bool {
        let (held, required) = (self.name(), required.name());
        held == required || (held == Role::ADMIN.name() && required == Role::USER.name())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
