//! Nero: Media Repository Engine
//!
//! A small media repository: binary assets tagged with one of several
//! metadata shapes, indexed in memory behind a reader/writer lock,
//! mirrored to a durable line-delimited JSON index file, and exposed
//! through lookup, filtered search, random sampling and content-addressed
//! ingestion.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod repo;
pub mod sniff;
