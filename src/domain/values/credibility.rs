use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Moderation-assigned credibility label. Owned by the moderation subsystem;
/// the clustering core only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Credibility {
    Disputed,
    Unverified,
    Probable,
    Verified,
}

impl Default for Credibility {
    fn default() -> Self {
        Credibility::Unverified
    }
}

impl fmt::Display for Credibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credibility::Disputed => write!(f, "disputed"),
            Credibility::Unverified => write!(f, "unverified"),
            Credibility::Probable => write!(f, "probable"),
            Credibility::Verified => write!(f, "verified"),
        }
    }
}

impl FromStr for Credibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disputed" => Ok(Credibility::Disputed),
            "unverified" => Ok(Credibility::Unverified),
            "probable" => Ok(Credibility::Probable),
            "verified" => Ok(Credibility::Verified),
            _ => Err(format!("Unknown credibility: {s}")),
        }
    }
}
