use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::str::FromStr;
use thiserror::Error as ThisError;

const SCHEME: &str = "urn";
const MAX_NID_LEN: usize = 32;

///
/// UrnError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum UrnError {
    #[error("urn must start with 'urn:'")]
    MissingScheme,

    #[error("invalid urn namespace identifier '{0}'")]
    InvalidNamespace(String),

    #[error("urn namespace-specific string is empty")]
    EmptySpecificString,
}

///
/// Urn
///
/// Record identifier of the form `urn:<nid>:<nss>`.
/// The scheme is matched case-insensitively and always rendered lowercase;
/// `nid` and `nss` keep the casing they were parsed with.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{value}")]
pub struct Urn {
    value: String,
    nid_end: usize,
}

impl Urn {
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        let (scheme, rest) = input.split_once(':').ok_or(UrnError::MissingScheme)?;
        if !scheme.eq_ignore_ascii_case(SCHEME) {
            return Err(UrnError::MissingScheme);
        }

        let (nid, nss) = rest
            .split_once(':')
            .ok_or_else(|| UrnError::InvalidNamespace(rest.to_string()))?;

        if !valid_nid(nid) {
            return Err(UrnError::InvalidNamespace(nid.to_string()));
        }
        if nss.is_empty() {
            return Err(UrnError::EmptySpecificString);
        }

        Ok(Self {
            value: format!("{SCHEME}:{nid}:{nss}"),
            nid_end: SCHEME.len() + 1 + nid.len(),
        })
    }

    /// Namespace identifier.
    #[must_use]
    pub fn nid(&self) -> &str {
        &self.value[SCHEME.len() + 1..self.nid_end]
    }

    /// Namespace-specific string.
    #[must_use]
    pub fn nss(&self) -> &str {
        &self.value[self.nid_end + 1..]
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

fn valid_nid(nid: &str) -> bool {
    !nid.is_empty()
        && nid.len() <= MAX_NID_LEN
        && !nid.starts_with('-')
        && nid.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Urn {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        Self::parse(&raw).map_err(D::Error::custom)
    }
}
