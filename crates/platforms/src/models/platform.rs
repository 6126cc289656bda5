//! Closed set of supported ad platforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported ad platform.
///
/// Adapter dispatch is keyed on this enum so that adding a platform is a
/// compile-time concern: every `match` over `Platform` must be extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "meta_ads")]
    Meta,
    #[serde(rename = "google_ads")]
    Google,
    #[serde(rename = "linkedin_ads")]
    LinkedIn,
    #[serde(rename = "pinterest_ads")]
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Meta,
        Platform::Google,
        Platform::LinkedIn,
        Platform::Pinterest,
    ];

    /// Stable identifier used in storage and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Meta => "meta_ads",
            Platform::Google => "google_ads",
            Platform::LinkedIn => "linkedin_ads",
            Platform::Pinterest => "pinterest_ads",
        }
    }

    /// Human-readable name for logs and API responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Meta => "Meta Ads",
            Platform::Google => "Google Ads",
            Platform::LinkedIn => "LinkedIn Ads",
            Platform::Pinterest => "Pinterest Ads",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta_ads" | "meta" => Ok(Platform::Meta),
            "google_ads" | "google" => Ok(Platform::Google),
            "linkedin_ads" | "linkedin" => Ok(Platform::LinkedIn),
            "pinterest_ads" | "pinterest" => Ok(Platform::Pinterest),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}
