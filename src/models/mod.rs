//! Data models for cardgen.
//!
//! This module defines the core data structures:
//! - `BacklogRecord` - One backlog item, normalized for display on a card
//! - `Rgb` - An 8-bit color triple used for card headers and text

use serde::{Serialize, Serializer};
use std::fmt;

/// Reserved assignee value meaning nobody has picked the item up yet.
pub const UNASSIGNED: &str = "Unassigned";

/// Rank strings at least this long are lexicographic ranks, not legacy numbers.
pub const LEXO_RANK_MIN_LEN: usize = 7;

/// Whether `rank` is a lexicographic rank rather than a short legacy number.
pub fn is_lexo_rank(rank: &str) -> bool {
    rank.chars().count() >= LEXO_RANK_MIN_LEN
}

/// One backlog item extracted from the export.
///
/// Every text field is always present; missing optional XML nodes become
/// empty strings during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BacklogRecord {
    /// Ticket number portion of the key (e.g. "42" for "PLAT-42")
    pub key: String,

    /// Project prefix split off the key (e.g. "PLAT")
    pub project: String,

    pub summary: String,

    /// Description, capped to four lines and 160 characters
    pub description: String,

    pub assignee: String,

    pub priority: String,

    /// Legacy numeric rank or lexicographic rank token
    pub rank: String,

    /// Component names (only present in some exports)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    /// Labels (only present in some exports)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl BacklogRecord {
    /// Whether the item carries the `Unassigned` sentinel.
    pub fn is_unassigned(&self) -> bool {
        self.assignee == UNASSIGNED
    }

    /// Full key as it appeared in the export.
    pub fn full_key(&self) -> String {
        if self.project.is_empty() {
            self.key.clone()
        } else {
            format!("{}-{}", self.project, self.key)
        }
    }
}

/// An 8-bit RGB color.
///
/// Serializes as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to the `0.0..=1.0` range used by PDF color operators.
    pub fn unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// Parse a `#rrggbb` hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
