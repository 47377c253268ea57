//! Depot location matching

use serde::{Deserialize, Serialize};

use crate::types::DomainError;

/// Whether a trip endpoint is the operator's own stockyard
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Depot,
    External,
}

/// Recognizes free-form location names that refer to the depot.
///
/// A location is the depot when, compared case-insensitively, it starts with
/// the canonical phrase or contains every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepotMatcher {
    canonical_name: String,
    tokens: Vec<String>,
}

impl DepotMatcher {
    pub const DEFAULT_CANONICAL_NAME: &'static str = "Acopio Maquipaes";
    pub const DEFAULT_TOKENS: [&'static str; 2] = ["acopio", "maquipaes"];

    pub fn new<I, S>(canonical_name: &str, tokens: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical_name = canonical_name.trim().to_lowercase();
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if canonical_name.is_empty() && tokens.is_empty() {
            return Err(DomainError::EmptyDepotMatcher);
        }

        Ok(Self {
            canonical_name,
            tokens,
        })
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn matches(&self, location: &str) -> bool {
        let location = location.trim().to_lowercase();
        if location.is_empty() {
            return false;
        }

        if !self.canonical_name.is_empty() && location.starts_with(&self.canonical_name) {
            return true;
        }

        !self.tokens.is_empty() && self.tokens.iter().all(|t| location.contains(t.as_str()))
    }

    pub fn classify(&self, location: &str) -> LocationKind {
        if self.matches(location) {
            LocationKind::Depot
        } else {
            LocationKind::External
        }
    }
}

impl Default for DepotMatcher {
    fn default() -> Self {
        Self {
            canonical_name: Self::DEFAULT_CANONICAL_NAME.to_lowercase(),
            tokens: Self::DEFAULT_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}
