//! Core type definitions for catalog items.
//!
//! All enums serialize in lowercase; [`FromStr`](std::str::FromStr) accepts any
//! casing so the PascalCase names Jellyfin uses parse as well.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog item the refresh engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A TV series (show).
    Series,
    /// A season within a series.
    Season,
    /// A single episode within a season.
    Episode,
}

impl ItemKind {
    /// All kinds, in the order a full run processes them.
    pub const ALL: [ItemKind; 3] = [ItemKind::Episode, ItemKind::Season, ItemKind::Series];

    /// The item type name used by Jellyfin's `IncludeItemTypes` filter.
    pub fn jellyfin_name(&self) -> &'static str {
        match self {
            Self::Series => "Series",
            Self::Season => "Season",
            Self::Episode => "Episode",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Season => write!(f, "season"),
            Self::Episode => write!(f, "episode"),
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "series" => Ok(Self::Series),
            "season" => Ok(Self::Season),
            "episode" => Ok(Self::Episode),
            _ => Err(format!("Invalid item kind: {}", s)),
        }
    }
}

/// Type of item image/artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Primary poster/thumbnail image.
    Primary,
    /// Clear art image.
    Art,
    /// Background/backdrop image.
    Backdrop,
    /// Banner image.
    Banner,
    /// Logo image.
    Logo,
    /// Thumbnail image.
    Thumb,
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Art => write!(f, "art"),
            Self::Backdrop => write!(f, "backdrop"),
            Self::Banner => write!(f, "banner"),
            Self::Logo => write!(f, "logo"),
            Self::Thumb => write!(f, "thumb"),
        }
    }
}

impl std::str::FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "art" => Ok(Self::Art),
            "backdrop" => Ok(Self::Backdrop),
            "banner" => Ok(Self::Banner),
            "logo" => Ok(Self::Logo),
            "thumb" => Ok(Self::Thumb),
            _ => Err(format!("Invalid image type: {}", s)),
        }
    }
}

/// Airing status of a series as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStatus {
    /// Still airing new episodes.
    Continuing,
    /// Finished airing.
    Ended,
    /// Announced but not yet aired.
    Unreleased,
}

impl fmt::Display for SeriesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuing => write!(f, "continuing"),
            Self::Ended => write!(f, "ended"),
            Self::Unreleased => write!(f, "unreleased"),
        }
    }
}

impl std::str::FromStr for SeriesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continuing" => Ok(Self::Continuing),
            "ended" => Ok(Self::Ended),
            "unreleased" => Ok(Self::Unreleased),
            _ => Err(format!("Invalid series status: {}", s)),
        }
    }
}
