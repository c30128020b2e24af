//! Persistence methods and transport verbs.
//!
//! The data-binding layer names its operations `create`, `read`, `update`,
//! `patch` and `delete`. The transport speaks HTTP-style verbs. Only the
//! first three are renamed; everything else passes through unchanged.
//!
//! | Method | Verb |
//! |--------|------|
//! | `create` | `post` |
//! | `read` | `get` |
//! | `update` | `put` |
//! | `patch` | `patch` |
//! | `delete` | `delete` |
//! | anything else | itself |

// ============================================================================
// Imports
// ============================================================================

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// SyncMethod
// ============================================================================

/// A persistence operation requested by a model or collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncMethod {
    /// Persist a new model.
    Create,
    /// Fetch a model or collection.
    Read,
    /// Replace a model.
    Update,
    /// Partially update a model.
    Patch,
    /// Destroy a model.
    Delete,
    /// Application-defined method, sent verbatim as the verb.
    Custom(String),
}

impl SyncMethod {
    /// Returns the method name as the data-binding layer spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Custom(name) => name,
        }
    }

    /// Maps this method to the transport verb.
    #[must_use]
    pub fn verb(&self) -> Verb {
        match self {
            Self::Create => Verb::Post,
            Self::Read => Verb::Get,
            Self::Update => Verb::Put,
            Self::Patch => Verb::Patch,
            Self::Delete => Verb::Delete,
            Self::Custom(name) => Verb::from(name.as_str()),
        }
    }
}

impl FromStr for SyncMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "create" => Self::Create,
            "read" => Self::Read,
            "update" => Self::Update,
            "patch" => Self::Patch,
            "delete" => Self::Delete,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<&str> for SyncMethod {
    #[inline]
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for SyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Verb
// ============================================================================

/// Transport-level verb sent with each request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `get`
    Get,
    /// `post`
    Post,
    /// `put`
    Put,
    /// `patch`
    Patch,
    /// `delete`
    Delete,
    /// Any other verb, spelled exactly as given.
    Other(String),
}

impl Verb {
    /// Returns the lowercase wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Other(verb) => verb,
        }
    }
}

impl From<&str> for Verb {
    fn from(s: &str) -> Self {
        match s {
            "get" => Self::Get,
            "post" => Self::Post,
            "put" => Self::Put,
            "patch" => Self::Patch,
            "delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Verb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

// ============================================================================
// Tests
// ============================================================================
