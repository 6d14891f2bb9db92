//! Rack asset identifiers and free-form input parsing

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Required identifier length (ASCII digits)
pub const ASSET_ID_LEN: usize = 10;

/// Token separators accepted between identifiers
const SEPARATORS: &[char] = &['\n', '\r', ',', ';', '\t', ' '];

/// Token is not exactly ten ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid asset id \"{token}\": not exactly 10 digits")]
pub struct InvalidAssetId {
    pub token: String,
}

/// Validated 10-digit rack asset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Validate a single token (surrounding whitespace is ignored)
    pub fn parse(token: &str) -> Result<Self, InvalidAssetId> {
        let s = token.trim();
        if s.len() == ASSET_ID_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidAssetId {
                token: s.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = InvalidAssetId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

/// Result of splitting free-form text into identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAssetIds {
    /// Valid identifiers, first occurrence order, no duplicates
    pub valid: Vec<AssetId>,
    /// Rejected tokens in input order (duplicates kept)
    pub invalid: Vec<String>,
}

impl ParsedAssetIds {
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }
}

/// Split text on newlines, commas, semicolons, tabs and spaces and
/// classify every non-empty token.
pub fn parse_asset_ids(raw: &str) -> ParsedAssetIds {
    let mut seen = HashSet::new();
    let mut parsed = ParsedAssetIds::default();

    for token in raw.split(SEPARATORS).map(str::trim).filter(|t| !t.is_empty()) {
        match AssetId::parse(token) {
            Ok(id) => {
                if seen.insert(id.clone()) {
                    parsed.valid.push(id);
                }
            }
            Err(e) => parsed.invalid.push(e.token),
        }
    }

    parsed
}
