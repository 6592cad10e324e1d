use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Dotted `category.name` locator for a token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenPath {
    pub category: String,
    pub name: String,
}

impl TokenPath {
    pub fn new(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
        }
    }

    /// A path addressing a whole category (empty token name).
    pub fn category(category: impl Into<String>) -> Self {
        Self::new(category, "")
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.category)
        } else {
            write!(f, "{}.{}", self.category, self.name)
        }
    }
}

impl FromStr for TokenPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((category, name)) if !category.is_empty() && !name.contains('.') => {
                Ok(Self::new(category, name))
            }
            None if !s.is_empty() => Ok(Self::category(s)),
            _ => Err(TypeError::InvalidPath(s.to_string())),
        }
    }
}

impl TryFrom<String> for TokenPath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TokenPath> for String {
    fn from(path: TokenPath) -> Self {
        path.to_string()
    }
}
