use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Output platform for the build tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Css,
    Scss,
    Js,
    Json,
    Ios,
    Android,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Css,
        Platform::Scss,
        Platform::Js,
        Platform::Json,
        Platform::Ios,
        Platform::Android,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Css => "css",
            Platform::Scss => "scss",
            Platform::Js => "js",
            Platform::Json => "json",
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| TypeError::UnknownPlatform(s.to_string()))
    }
}
