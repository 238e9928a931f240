//! Content catalog configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Content catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// TMDB API key; without it the built-in catalog is used
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,

    /// Poster image base URL
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Popular movies per pool
    #[serde(default = "default_movie_count")]
    pub movie_count: usize,

    /// Popular TV shows per pool
    #[serde(default = "default_tv_count")]
    pub tv_count: usize,

    /// Trending titles per pool
    #[serde(default = "default_trending_count")]
    pub trending_count: usize,
}

impl CatalogConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if the remote catalog is configured
    pub fn has_tmdb(&self) -> bool {
        self.tmdb_api_key
            .as_ref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        for url in [&self.tmdb_base_url, &self.image_base_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidBaseUrl(url.clone()));
            }
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            tmdb_base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout(),
            movie_count: default_movie_count(),
            tv_count: default_tv_count(),
            trending_count: default_trending_count(),
        }
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_movie_count() -> usize {
    7
}

fn default_tv_count() -> usize {
    7
}

fn default_trending_count() -> usize {
    6
}
