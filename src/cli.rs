//! CLI Tooling
//!
//! Command-line interface for managing media repositories defined in the
//! configuration file. Commands operate directly on the repository
//! engine; repositories are opened on demand from their configuration.

use crate::config::{ConfigLoader, NeroConfig};
use crate::error::{ApiError, RepoError, StorageError};
use crate::media::meta::{AnimeMeta, GenericMeta, Metadata};
use crate::media::{Format, Media};
use crate::repo::Repository;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Nero CLI - media repository management
#[derive(Parser)]
#[command(name = "nero")]
#[command(about = "Media repository manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, short, default_value = "config.toml", env = "NERO_CONFIG_PATH")]
    pub config: PathBuf,

    /// Log level override (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an example configuration file
    Config {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List all media in a repository
    List {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show a media record by ID
    Get {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// Media ID
        id: Uuid,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Search media by metadata query
    Find {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// Text query matched against metadata
        query: String,
        /// Restrict results to a format (image, animated-image or any)
        #[arg(long, default_value = "any")]
        kind: Format,
        /// Maximum number of results
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Pick random media from a repository
    Random {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// Number of records to pick
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Upload a file into a repository
    Upload {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// The uploaded file path
        #[arg(long, short = 'f')]
        path: PathBuf,
        #[command(subcommand)]
        meta: UploadMeta,
    },
    /// Delete media from a repository
    Delete {
        /// Repository ID
        #[arg(long, short)]
        repo: String,
        /// The media ID to be deleted
        #[arg(long, short)]
        id: Uuid,
    },
}

/// Metadata attached to an upload.
#[derive(Subcommand)]
pub enum UploadMeta {
    /// Upload with generic, artist-attributed metadata
    Generic {
        /// The source, i.e. a URL
        #[arg(long)]
        source: Option<String>,
        /// The artist name
        #[arg(long)]
        artist: Option<String>,
        /// A link to the artist
        #[arg(long)]
        artist_link: Option<String>,
    },
    /// Upload with anime metadata
    Anime {
        /// The anime name
        #[arg(long)]
        name: String,
    },
}

impl UploadMeta {
    fn to_metadata(&self) -> Metadata {
        match self {
            UploadMeta::Generic {
                source,
                artist,
                artist_link,
            } => Metadata::Generic(GenericMeta {
                source: source.clone().unwrap_or_default(),
                artist: artist.clone().unwrap_or_default(),
                artist_link: artist_link.clone().unwrap_or_default(),
            }),
            UploadMeta::Anime { name } => Metadata::Anime(AnimeMeta::new(name.clone())),
        }
    }
}

/// CLI context holding the loaded configuration.
pub struct CliContext {
    config: NeroConfig,
    config_path: PathBuf,
}

impl CliContext {
    /// Create a new CLI context. A missing configuration file yields an
    /// empty configuration so the `config` command can bootstrap one.
    pub fn new(config_path: PathBuf) -> Result<Self, ApiError> {
        let config = if config_path.exists() {
            ConfigLoader::load_from_file(&config_path)?
        } else {
            NeroConfig::default()
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &NeroConfig {
        &self.config
    }

    // Open the repository with the given ID from configuration.
    fn open_repo(&self, id: &str) -> Result<Repository, ApiError> {
        let repo_config = self.config.repos.get(id).ok_or_else(|| {
            ApiError::ConfigError(format!(
                "Unknown repository {} in {}",
                id,
                self.config_path.display()
            ))
        })?;

        Repository::open(id, &repo_config.path, repo_config.lock_path()).map_err(ApiError::from)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Config { force } => self.handle_config(*force),
            Commands::List { repo, format } => {
                let repo = self.open_repo(repo)?;
                let mut items = repo.items();
                // Index order is unspecified; sort for stable output.
                items.sort_by_key(|m| m.id);
                render_records(&items, format)
            }
            Commands::Get { repo, id, format } => {
                let repo = self.open_repo(repo)?;
                match repo.get(*id) {
                    Some(media) => render_records(std::slice::from_ref(&media), format),
                    None => Ok(format!("No media with id {}", id)),
                }
            }
            Commands::Find {
                repo,
                query,
                kind,
                limit,
                format,
            } => {
                let repo = self.open_repo(repo)?;
                render_records(&repo.find(query, *kind, *limit), format)
            }
            Commands::Random {
                repo,
                count,
                format,
            } => {
                let repo = self.open_repo(repo)?;
                render_records(&repo.random(*count), format)
            }
            Commands::Upload { repo, path, meta } => {
                let repo = self.open_repo(repo)?;
                let bytes = std::fs::read(path)
                    .map_err(|e| RepoError::from(StorageError::io("read", path.clone(), e)))?;
                let media = repo.create(&bytes, Some(meta.to_metadata()))?;
                Ok(format!(
                    "Uploaded {} as {} ({})",
                    path.display(),
                    media.id,
                    media.format
                ))
            }
            Commands::Delete { repo, id } => {
                let repo = self.open_repo(repo)?;
                repo.remove(*id)?;
                Ok(format!("Deleted {} from {}", id, repo.id()))
            }
        }
    }

    fn handle_config(&self, force: bool) -> Result<String, ApiError> {
        if self.config_path.exists() && !force {
            return Err(ApiError::ConfigError(format!(
                "{} already exists, pass --force to overwrite",
                self.config_path.display()
            )));
        }

        let rendered = ConfigLoader::render(&ConfigLoader::example())?;
        std::fs::write(&self.config_path, rendered).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to write {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(format!(
            "Wrote example configuration to {}",
            self.config_path.display()
        ))
    }
}

// Text output is one line per record; json is the serialized record list.
fn render_records(records: &[Media], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(records)?);
    }

    if records.is_empty() {
        return Ok("No media found".to_string());
    }

    let lines: Vec<String> = records
        .iter()
        .map(|media| {
            let meta = match &media.meta {
                Some(Metadata::Generic(m)) => format!("  [generic: {}]", m.artist),
                Some(Metadata::Anime(m)) => format!("  [anime: {}]", m.name),
                None => String::new(),
            };
            format!(
                "{}  {}  {}{}",
                media.id,
                media.format,
                media.path.display(),
                meta
            )
        })
        .collect();

    Ok(lines.join("\n"))
}
