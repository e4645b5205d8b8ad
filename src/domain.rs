use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeggError;

const MAP_DIGITS: usize = 5;

/// A pathway map identifier such as `map00520` or `hsa00010`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MapId(String);

impl MapId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix in front of the five-digit map number (`map`, `hsa`, `ko`, ...).
    pub fn code(&self) -> &str {
        &self.0[..self.0.len() - MAP_DIGITS]
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MapId {
    type Err = KeggError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = normalized.is_ascii()
            && normalized.len() > MAP_DIGITS
            && normalized[normalized.len() - MAP_DIGITS..]
                .chars()
                .all(|ch| ch.is_ascii_digit())
            && normalized[..normalized.len() - MAP_DIGITS]
                .chars()
                .all(|ch| ch.is_ascii_alphabetic());
        if !is_valid {
            return Err(KeggError::InvalidMapId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

impl TryFrom<String> for MapId {
    type Error = KeggError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MapId> for String {
    fn from(id: MapId) -> Self {
        id.0
    }
}

/// Three or four letter KEGG organism code (`hsa`, `mmu`, `ath`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganismCode(String);

impl OrganismCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the organism's BRITE pathway hierarchy export.
    pub fn htext_name(&self) -> String {
        format!("{}00001.keg", self.0)
    }
}

impl fmt::Display for OrganismCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrganismCode {
    type Err = KeggError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let is_valid =
            !normalized.is_empty() && normalized.chars().all(|ch| ch.is_ascii_alphanumeric());
        if !is_valid {
            return Err(KeggError::InvalidOrganismCode(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

impl TryFrom<String> for OrganismCode {
    type Error = KeggError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrganismCode> for String {
    fn from(code: OrganismCode) -> Self {
        code.0
    }
}
