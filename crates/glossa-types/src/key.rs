//! Logical key identity.
//!
//! Branch forks copy keys into fresh rows, so the database id of a key says
//! nothing about which key it is on another branch. Diff and merge match keys
//! by [`KeyIdentity`] instead: the `(namespace, name)` pair.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Translations of one key: `language -> value`, ordered by language.
pub type LanguageValues = BTreeMap<String, String>;

/// Maximum length accepted for a language code (BCP 47 upper bound).
const MAX_LANGUAGE_LEN: usize = 35;

/// The `(namespace, name)` pair identifying a logical key within a branch.
///
/// Ordering puts keys without a namespace first, then sorts by namespace and
/// name. Diff output relies on this order being total and stable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawKeyIdentity")]
pub struct KeyIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct RawKeyIdentity {
    #[serde(default)]
    namespace: Option<String>,
    name: String,
}

impl TryFrom<RawKeyIdentity> for KeyIdentity {
    type Error = TypeError;

    fn try_from(raw: RawKeyIdentity) -> Result<Self, Self::Error> {
        KeyIdentity::new(raw.namespace.as_deref(), raw.name)
    }
}

impl KeyIdentity {
    /// Build an identity, normalizing a blank namespace to `None`.
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::InvalidKeyName {
                name,
                reason: "key name must not be empty".into(),
            });
        }
        if name.chars().any(char::is_control) {
            return Err(TypeError::InvalidKeyName {
                name,
                reason: "key name must not contain control characters".into(),
            });
        }
        if let Some(ns) = namespace.filter(|ns| ns.contains(':')) {
            return Err(TypeError::InvalidNamespace(ns.to_string()));
        }
        Ok(Self {
            namespace: normalize_namespace(namespace),
            name,
        })
    }

    /// Build an identity from stored columns. Values read back from the store
    /// were validated on the way in.
    pub fn from_columns(namespace: Option<String>, name: String) -> Self {
        Self {
            namespace: normalize_namespace(namespace.as_deref()),
            name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn normalize_namespace(namespace: Option<&str>) -> Option<String> {
    namespace
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
}

/// Renders `namespace:name`, or the bare name. A bare name that contains
/// `:` gets a leading `:` so that it parses back without a namespace.
impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}:{}", self.name),
            None if self.name.contains(':') => write!(f, ":{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Parses `namespace:name`, `:name` or a bare `name`. Everything after the
/// first `:` is the name.
impl FromStr for KeyIdentity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((ns, name)) => Self::new(Some(ns), name),
            None => Self::new(None, s),
        }
    }
}

/// Validate a language code such as `en`, `pt-BR` or `zh_Hant`.
pub fn validate_language(code: &str) -> Result<(), TypeError> {
    let valid = !code.is_empty()
        && code.len() <= MAX_LANGUAGE_LEN
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TypeError::InvalidLanguage(code.to_string()))
    }
}
