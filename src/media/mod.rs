//! Media records.
//!
//! A record ties a generated identity to a format classification, the
//! backing file on disk and an optional metadata variant. Records are
//! immutable after creation: the repository replaces, never mutates.

pub mod meta;

use crate::media::meta::Metadata;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Classified format of a media payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Format {
    /// Unclassified content; doubles as the "any format" query sentinel.
    Unknown = 0,
    /// A still image.
    Image = 1,
    /// An animated image.
    AnimatedImage = 2,
}

impl From<Format> for u8 {
    fn from(format: Format) -> u8 {
        format as u8
    }
}

impl TryFrom<u8> for Format {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Unknown),
            1 => Ok(Format::Image),
            2 => Ok(Format::AnimatedImage),
            other => Err(format!("unrecognized media format {}", other)),
        }
    }
}

impl Format {
    /// Human-readable name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Unknown => "unknown",
            Format::Image => "image",
            Format::AnimatedImage => "animated-image",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" | "any" => Ok(Format::Unknown),
            "image" => Ok(Format::Image),
            "animated-image" | "animated" => Ok(Format::AnimatedImage),
            other => Err(format!("unknown media format: {}", other)),
        }
    }
}

/// A single media record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    /// Unique identity, generated at creation.
    pub id: Uuid,
    /// Format classification, set once from content sniffing.
    pub format: Format,
    /// Location of the backing byte payload. Absolute in memory; the
    /// persisted form is relativized against the repository storage
    /// directory when possible.
    pub path: PathBuf,
    /// Metadata variant, if any.
    pub meta: Option<Metadata>,
}

/// Two-stage decode: the fixed fields plus a raw metadata blob first, then
/// the blob dispatched through the tag-directed metadata decode. Any
/// failure at either stage marks the whole record as corrupt.
impl<'de> Deserialize<'de> for Media {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            id: Uuid,
            format: Format,
            path: PathBuf,
            #[serde(default)]
            meta: Option<serde_json::Value>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let meta = match raw.meta {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(Metadata::from_value(value).map_err(serde::de::Error::custom)?),
        };

        Ok(Media {
            id: raw.id,
            format: raw.format,
            path: raw.path,
            meta,
        })
    }
}
