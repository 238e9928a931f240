//! TMDB Catalog - Content supplier over The Movie Database REST API.
//!
//! Blends three sub-sources fetched concurrently: popular movies, popular
//! TV shows and this week's trending titles. Entries without a poster are
//! dropped, genre ids are resolved through a cached genre table, and the
//! final mix is shuffled without a seed.
//!
//! # Configuration
//!
//! ```ignore
//! let config = TmdbConfig::new(api_key)
//!     .with_base_url("https://api.themoviedb.org/3")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let catalog = TmdbCatalog::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::catalog::{exclude_ids, shuffle_random, Item, MAX_SCORE};
use crate::domain::foundation::{DomainError, ItemId};
use crate::ports::{ContentSupplier, SupplierError};

/// Runtime assumed for movies the API reports without one.
const DEFAULT_MOVIE_RUNTIME: u32 = 120;

/// Runtime assumed for shows the API reports without one.
const DEFAULT_EPISODE_RUNTIME: u32 = 45;

const UNKNOWN_GENRE: &str = "Unknown";

/// Configuration for the TMDB catalog.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key, sent as the `api_key` query parameter.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.themoviedb.org/3).
    pub base_url: String,
    /// Prefix joined with a poster path to form the poster URL.
    pub image_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Popular movies taken into the mix.
    pub movie_count: usize,
    /// Popular TV shows taken into the mix.
    pub tv_count: usize,
    /// Trending titles taken into the mix.
    pub trending_count: usize,
}

impl TmdbConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            timeout: Duration::from_secs(10),
            movie_count: 7,
            tv_count: 7,
            trending_count: 6,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the poster image base URL.
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many titles each sub-source contributes.
    pub fn with_mix(mut self, movies: usize, tv: usize, trending: usize) -> Self {
        self.movie_count = movies;
        self.tv_count = tv;
        self.trending_count = trending;
        self
    }

    /// Returns true if an API key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// TMDB-backed content supplier.
pub struct TmdbCatalog {
    config: TmdbConfig,
    client: Client,
    genres: RwLock<Option<HashMap<u32, String>>>,
}

impl TmdbCatalog {
    /// Creates a catalog with its own HTTP client.
    pub fn new(config: TmdbConfig) -> Result<Self, SupplierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SupplierError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            genres: RwLock::new(None),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SupplierError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.config.api_key())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SupplierError::Network(format!(
                        "Request to {} timed out after {}s",
                        path,
                        self.config.timeout.as_secs()
                    ))
                } else {
                    SupplierError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SupplierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SupplierError::Decode(e.to_string()))
    }

    /// Genre table, fetched once. Falls back to the built-in table.
    async fn genre_map(&self) -> HashMap<u32, String> {
        if let Some(genres) = self.genres.read().await.as_ref() {
            return genres.clone();
        }

        let (movie, tv) = futures::join!(
            self.get_json::<GenreList>("/genre/movie/list"),
            self.get_json::<GenreList>("/genre/tv/list"),
        );
        let genres = match (movie, tv) {
            (Ok(movie), Ok(tv)) => merge_genres(movie, tv),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to fetch genre lists, using built-in table");
                fallback_genres()
            }
        };

        *self.genres.write().await = Some(genres.clone());
        genres
    }
}

#[async_trait]
impl ContentSupplier for TmdbCatalog {
    async fn fetch_pool(&self, exclude: &HashSet<ItemId>) -> Result<Vec<Item>, SupplierError> {
        if !self.config.has_api_key() {
            return Err(SupplierError::NotConfigured(
                "TMDB API key is not set".to_string(),
            ));
        }

        let genres = self.genre_map().await;
        let (movies, shows, trending) = futures::join!(
            self.get_json::<Page<TmdbMovie>>("/movie/popular"),
            self.get_json::<Page<TmdbShow>>("/tv/popular"),
            self.get_json::<Page<TrendingEntry>>("/trending/all/week"),
        );

        if let (Err(e), Err(_), Err(_)) = (&movies, &shows, &trending) {
            return Err(e.clone());
        }

        let image_base = self.config.image_base_url.as_str();
        let movies: Vec<Item> = sub_source("movies", movies)
            .into_iter()
            .filter_map(|m| movie_to_item(m, &genres, image_base))
            .collect();
        let shows: Vec<Item> = sub_source("tv", shows)
            .into_iter()
            .filter_map(|s| show_to_item(s, &genres, image_base))
            .collect();
        let trending: Vec<Item> = sub_source("trending", trending)
            .into_iter()
            .filter_map(|entry| match entry {
                TrendingEntry::Movie(m) => movie_to_item(m, &genres, image_base),
                TrendingEntry::Tv(s) => show_to_item(s, &genres, image_base),
                TrendingEntry::Other => None,
            })
            .collect();

        let mut mix = Vec::new();
        mix.extend(exclude_ids(movies, exclude).into_iter().take(self.config.movie_count));
        mix.extend(exclude_ids(shows, exclude).into_iter().take(self.config.tv_count));
        mix.extend(exclude_ids(trending, exclude).into_iter().take(self.config.trending_count));

        debug!(count = mix.len(), "Fetched TMDB mix");
        Ok(shuffle_random(&mix))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

/// A failed sub-source contributes nothing.
fn sub_source<T>(name: &str, result: Result<Page<T>, SupplierError>) -> Vec<T> {
    match result {
        Ok(page) => page.results,
        Err(e) => {
            warn!(source = name, error = %e, "TMDB sub-source failed");
            Vec::new()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: u64,
    #[serde(default)]
    title: String,
    poster_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    runtime: Option<u32>,
    #[serde(default)]
    vote_average: f32,
    #[serde(default)]
    overview: String,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbShow {
    id: u64,
    #[serde(default)]
    name: String,
    poster_path: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    episode_run_time: Option<Vec<u32>>,
    #[serde(default)]
    vote_average: f32,
    #[serde(default)]
    overview: String,
    first_air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
enum TrendingEntry {
    Movie(TmdbMovie),
    Tv(TmdbShow),
    #[serde(other)]
    Other,
}

// ════════════════════════════════════════════════════════════════════════════
// Conversion
// ════════════════════════════════════════════════════════════════════════════

fn movie_to_item(movie: TmdbMovie, genres: &HashMap<u32, String>, image_base: &str) -> Option<Item> {
    let poster = poster_url(movie.poster_path.as_deref(), image_base)?;
    let runtime = movie.runtime.filter(|r| *r > 0).unwrap_or(DEFAULT_MOVIE_RUNTIME);

    build_item(
        format!("movie_{}", movie.id),
        movie.title,
        primary_genre(&movie.genre_ids, genres),
        runtime,
        movie.vote_average,
        movie.overview,
        parse_year(movie.release_date.as_deref()),
        poster,
    )
}

fn show_to_item(show: TmdbShow, genres: &HashMap<u32, String>, image_base: &str) -> Option<Item> {
    let poster = poster_url(show.poster_path.as_deref(), image_base)?;
    let runtime = show
        .episode_run_time
        .as_ref()
        .and_then(|times| times.first().copied())
        .filter(|r| *r > 0)
        .unwrap_or(DEFAULT_EPISODE_RUNTIME);

    build_item(
        format!("tv_{}", show.id),
        show.name,
        primary_genre(&show.genre_ids, genres),
        runtime,
        show.vote_average,
        show.overview,
        parse_year(show.first_air_date.as_deref()),
        poster,
    )
}

#[allow(clippy::too_many_arguments)]
fn build_item(
    id: String,
    title: String,
    category: String,
    runtime: u32,
    vote_average: f32,
    overview: String,
    year: Option<i32>,
    poster: String,
) -> Option<Item> {
    let mut item = match Item::new(id, title, category, runtime, round_score(vote_average)) {
        Ok(item) => item,
        Err(e) => {
            let report = DomainError::from(e);
            debug!(
                code = %report.code,
                details = ?report.details,
                error = %report.message,
                "Skipping malformed TMDB entry"
            );
            return None;
        }
    };

    if !overview.trim().is_empty() {
        item = item.with_description(overview);
    }
    if let Some(year) = year {
        item = item.with_year(year);
    }
    Some(item.with_poster_url(poster))
}

fn poster_url(path: Option<&str>, image_base: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", image_base, p))
}

fn primary_genre(ids: &[u32], genres: &HashMap<u32, String>) -> String {
    ids.first()
        .and_then(|id| genres.get(id))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
}

/// Year from an ISO date such as `2024-05-01`.
fn parse_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// One decimal place, clamped to the item score range.
fn round_score(vote_average: f32) -> f32 {
    ((vote_average * 10.0).round() / 10.0).clamp(0.0, MAX_SCORE)
}

/// Movie genres first; TV genres only fill ids the movie list lacks.
fn merge_genres(movie: GenreList, tv: GenreList) -> HashMap<u32, String> {
    let mut genres = HashMap::new();
    for genre in movie.genres.into_iter().chain(tv.genres) {
        genres.entry(genre.id).or_insert(genre.name);
    }
    genres
}

fn fallback_genres() -> HashMap<u32, String> {
    [
        (28, "Action"),
        (35, "Comedy"),
        (18, "Drama"),
        (27, "Horror"),
        (878, "Science Fiction"),
        (53, "Thriller"),
        (16, "Animation"),
        (10749, "Romance"),
        (14, "Fantasy"),
        (80, "Crime"),
    ]
    .into_iter()
    .map(|(id, name)| (id, name.to_string()))
    .collect()
}
