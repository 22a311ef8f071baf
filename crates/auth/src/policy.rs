//! Access policy: which role each method/path combination requires.
//!
//! Evaluated before any handler runs. Rules are checked in order; the first rule
//! whose method and path prefix match decides. Requests no rule matches only need
//! an authenticated principal.

use std::borrow::Cow;

use crate::{AuthzError, Principal, Role, authorize};

/// What a request needs from its principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    pub method: Cow<'static, str>,
    /// Matches the prefix itself and anything below it (`/animes`, `/animes/1`),
    /// but not siblings sharing the same characters (`/animesx`).
    pub path_prefix: Cow<'static, str>,
    pub required: Role,
}

impl AccessRule {
    pub fn new(
        method: impl Into<Cow<'static, str>>,
        path_prefix: impl Into<Cow<'static, str>>,
        required: Role,
    ) -> Self {
        Self {
            method: method.into(),
            path_prefix: path_prefix.into(),
            required,
        }
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        if !self.method.eq_ignore_ascii_case(method) {
            return false;
        }
        let prefix = self.path_prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Policy for the anime resource: reads need `USER`, writes need `ADMIN`.
    pub fn animes() -> Self {
        Self::new(vec![
            AccessRule::new("POST", "/animes", Role::ADMIN),
            AccessRule::new("GET", "/animes", Role::USER),
            AccessRule::new("PUT", "/animes", Role::ADMIN),
            AccessRule::new("DELETE", "/animes", Role::ADMIN),
        ])
    }

    pub fn requirement(&self, method: &str, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| Requirement::Role(rule.required.clone()))
            .unwrap_or(Requirement::Authenticated)
    }

    /// Check an authenticated principal against the requirement for this request.
    pub fn check(&self, principal: &Principal, method: &str, path: &str) -> Result<(), AuthzError> {
        match self.requirement(method, path) {
            Requirement::Authenticated => Ok(()),
            Requirement::Role(required) => authorize(principal, &required),
        }
    }
}
