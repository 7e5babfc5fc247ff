use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ufo,
    Ghost,
    Cryptid,
    Psychic,
    Possession,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Ufo => write!(f, "ufo"),
            Category::Ghost => write!(f, "ghost"),
            Category::Cryptid => write!(f, "cryptid"),
            Category::Psychic => write!(f, "psychic"),
            Category::Possession => write!(f, "possession"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ufo" => Ok(Category::Ufo),
            "ghost" => Ok(Category::Ghost),
            "cryptid" => Ok(Category::Cryptid),
            "psychic" => Ok(Category::Psychic),
            "possession" => Ok(Category::Possession),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}
