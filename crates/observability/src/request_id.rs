//! Per-request correlation id.

use std::fmt;

use uuid::Uuid;

/// Header a caller may use to supply its own id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// Correlation id attached to every request, its log span, and its error body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// A fresh time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Reuse a caller-supplied id when it is printable ASCII and reasonably short,
    /// otherwise generate one.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v)
                if !v.is_empty()
                    && v.len() <= MAX_LEN
                    && v.bytes().all(|b| b.is_ascii_graphic()) =>
            {
                Self(v.to_string())
            }
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_supplied_id_is_kept() {
        assert_eq!(RequestId::from_header(Some(" abc-123 ")).as_str(), "abc-123");
    }

    #[test]
    fn unusable_ids_are_replaced() {
        let long = "x".repeat(MAX_LEN + 1);
        for value in [None, Some(""), Some("has space"), Some(long.as_str())] {
            let id = RequestId::from_header(value);
            assert_eq!(id.as_str().len(), 32, "{value:?}");
        }
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
