//! User-facing search and report options.
//!
//! All four controls are closed enumerations, never free text. Each enum
//! knows the code the external collaborator expects (`gl`/`hl` locale codes,
//! `qdr:` recency codes) and parses from the kebab-case form used on the
//! command line.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report tone passed to the synthesizer's prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Simplified,
    Academic,
    Conversational,
}

impl Tone {
    /// The tone wording interpolated into the prompt contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Simplified => "Simplified",
            Tone::Academic => "Academic",
            Tone::Conversational => "Conversational",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "simplified" => Ok(Tone::Simplified),
            "academic" => Ok(Tone::Academic),
            "conversational" => Ok(Tone::Conversational),
            other => Err(format!(
                "unknown tone '{other}' (expected professional, simplified, academic, or conversational)"
            )),
        }
    }
}

/// Publication-date recency filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeFilter {
    /// No time-range restriction.
    #[default]
    Any,
    PastWeek,
    PastMonth,
    PastYear,
}

impl TimeFilter {
    /// The provider's recency code, or `None` for the "any" sentinel.
    pub fn recency_code(&self) -> Option<&'static str> {
        match self {
            TimeFilter::Any => None,
            TimeFilter::PastWeek => Some("w"),
            TimeFilter::PastMonth => Some("m"),
            TimeFilter::PastYear => Some("y"),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeFilter::Any => "any",
            TimeFilter::PastWeek => "past-week",
            TimeFilter::PastMonth => "past-month",
            TimeFilter::PastYear => "past-year",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(TimeFilter::Any),
            "past-week" | "week" | "w" => Ok(TimeFilter::PastWeek),
            "past-month" | "month" | "m" => Ok(TimeFilter::PastMonth),
            "past-year" | "year" | "y" => Ok(TimeFilter::PastYear),
            other => Err(format!(
                "unknown time filter '{other}' (expected any, past-week, past-month, or past-year)"
            )),
        }
    }
}

/// Search region preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    #[default]
    UnitedStates,
    India,
    UnitedKingdom,
    Germany,
    Australia,
}

impl Region {
    /// The provider's `gl` country code.
    pub fn code(&self) -> &'static str {
        match self {
            Region::UnitedStates => "us",
            Region::India => "in",
            Region::UnitedKingdom => "uk",
            Region::Germany => "de",
            Region::Australia => "au",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::UnitedStates => "united-states",
            Region::India => "india",
            Region::UnitedKingdom => "united-kingdom",
            Region::Germany => "germany",
            Region::Australia => "australia",
        };
        f.write_str(s)
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "united-states" | "us" => Ok(Region::UnitedStates),
            "india" | "in" => Ok(Region::India),
            "united-kingdom" | "uk" => Ok(Region::UnitedKingdom),
            "germany" | "de" => Ok(Region::Germany),
            "australia" | "au" => Ok(Region::Australia),
            other => Err(format!(
                "unknown region '{other}' (expected united-states, india, united-kingdom, germany, or australia)"
            )),
        }
    }
}

/// Search language preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Spanish,
}

impl Language {
    /// The provider's `hl` language code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::English => "english",
            Language::German => "german",
            Language::French => "french",
            Language::Spanish => "spanish",
        };
        f.write_str(s)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "german" | "de" => Ok(Language::German),
            "french" | "fr" => Ok(Language::French),
            "spanish" | "es" => Ok(Language::Spanish),
            other => Err(format!(
                "unknown language '{other}' (expected english, german, french, or spanish)"
            )),
        }
    }
}

/// The full set of locale/time filters for one search request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub time: TimeFilter,
    pub region: Region,
    pub language: Language,
}
