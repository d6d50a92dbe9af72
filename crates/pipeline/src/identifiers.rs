//! Newtype domain identifiers.
//!
//! Every concept with an identity is a distinct newtype wrapping a primitive, so
//! a WordPress [`PostId`] can never be passed where a [`MediaId`] is expected even
//! though both are `u64` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (CMS-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

u64_id! {
    /// Identifies a post created in the CMS.
    PostId
}

u64_id! {
    /// Identifies an uploaded media item in the CMS (used as `featured_media`).
    MediaId
}

u64_id! {
    /// Identifies a CMS category. Drafts are always filed under one fixed category.
    CategoryId
}

// ---------------------------------------------------------------------------

/// Identifies a single pipeline run (one inbound request).
///
/// Generated fresh per request and recorded on tracing spans so every outbound
/// call made on behalf of one request can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// A product search keyword (e.g. `"무선마우스"`).
///
/// Always trimmed and never empty; an absent or blank keyword is rejected at the
/// inbound boundary before any outbound call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Creates a keyword, returning `None` if the value is empty after trimming.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let v = value.as_ref().trim();
        if v.is_empty() {
            None
        } else {
            Some(Self(v.to_string()))
        }
    }

    /// Returns the keyword as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Keyword {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Keyword::new(&raw).ok_or_else(|| serde::de::Error::custom("keyword must not be blank"))
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_trimmed() {
        let kw = Keyword::new("  무선마우스 ").unwrap();
        assert_eq!(kw.as_str(), "무선마우스");
    }

    #[test]
    fn blank_keyword_is_rejected() {
        assert!(Keyword::new("").is_none());
        assert!(Keyword::new("   \t").is_none());
    }

    #[test]
    fn deserialized_keywords_go_through_the_same_check() {
        let kw: Keyword = serde_json::from_str("\"  mouse \"").unwrap();
        assert_eq!(kw.as_str(), "mouse");

        let blank = serde_json::from_str::<Keyword>("\"   \"").unwrap_err();
        assert!(blank.to_string().contains("keyword must not be blank"));
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&PostId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
