//! Media metadata variants.
//!
//! A closed, tagged union of metadata shapes. Every variant carries an
//! explicit integer discriminant in its serialized form so a blob can be
//! decoded without external type information.

use serde::{Deserialize, Serialize, Serializer};
use std::sync::OnceLock;

/// Discriminant tag carried by every serialized metadata variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tag {
    /// Generic, artist-attributed metadata ([`GenericMeta`]).
    Generic = 0,
    /// Anime-attributed metadata ([`AnimeMeta`]).
    Anime = 1,
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Tag::Generic),
            1 => Ok(Tag::Anime),
            other => Err(format!("unrecognized metadata type {}", other)),
        }
    }
}

/// Generic, artist-attributed metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenericMeta {
    /// The media source, i.e. a URL.
    #[serde(default)]
    pub source: String,
    /// The identifier of the artist, i.e. their name.
    #[serde(default)]
    pub artist: String,
    /// A reference to the artist, i.e. a URL.
    #[serde(default)]
    pub artist_link: String,
}

impl Serialize for GenericMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            #[serde(rename = "type")]
            tag: Tag,
            source: &'a str,
            artist: &'a str,
            artist_link: &'a str,
        }

        Repr {
            tag: Tag::Generic,
            source: &self.source,
            artist: &self.artist,
            artist_link: &self.artist_link,
        }
        .serialize(serializer)
    }
}

/// Anime-attributed metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimeMeta {
    /// The anime name.
    pub name: String,
    // Lower-cased name, folded lazily on first match.
    #[serde(skip)]
    folded: OnceLock<String>,
}

impl AnimeMeta {
    pub fn new(name: impl Into<String>) -> Self {
        AnimeMeta {
            name: name.into(),
            folded: OnceLock::new(),
        }
    }

    /// Case-insensitive substring match against the anime name.
    ///
    /// The lower-cased name is computed once and memoized; callers observe
    /// this as a pure function.
    pub fn matches(&self, query: &str) -> bool {
        self.folded
            .get_or_init(|| self.name.to_lowercase())
            .contains(&query.to_lowercase())
    }
}

// The memoized fold must stay invisible; equality is over the name alone.
impl PartialEq for AnimeMeta {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AnimeMeta {}

impl Serialize for AnimeMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            #[serde(rename = "type")]
            tag: Tag,
            name: &'a str,
        }

        Repr {
            tag: Tag::Anime,
            name: &self.name,
        }
        .serialize(serializer)
    }
}

/// A piece of media metadata, one variant per shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metadata {
    /// Generic, artist-attributed metadata.
    Generic(GenericMeta),
    /// Anime-attributed metadata.
    Anime(AnimeMeta),
}

impl Metadata {
    /// The discriminant tag of this variant.
    pub fn tag(&self) -> Tag {
        match self {
            Metadata::Generic(_) => Tag::Generic,
            Metadata::Anime(_) => Tag::Anime,
        }
    }

    /// Match the metadata against a text query.
    ///
    /// Matching is a per-variant capability: variants without it never
    /// match, regardless of the query.
    pub fn matches(&self, query: &str) -> bool {
        match self {
            Metadata::Generic(_) => false,
            Metadata::Anime(m) => m.matches(query),
        }
    }

    /// Decode a metadata blob in two phases: first only the discriminant
    /// tag, then the full shape it indicates.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(rename = "type")]
            tag: u8,
        }

        let probe: Probe = serde_json::from_value(value.clone())?;
        match Tag::try_from(probe.tag) {
            Ok(Tag::Generic) => Ok(Metadata::Generic(serde_json::from_value(value)?)),
            Ok(Tag::Anime) => Ok(Metadata::Anime(serde_json::from_value(value)?)),
            Err(e) => Err(serde::de::Error::custom(e)),
        }
    }
}
