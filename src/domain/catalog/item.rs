//! Item entity - a rateable candidate supplied by the content source.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ItemId, ValidationError};

/// Upper bound of the supplier's rating scale.
pub const MAX_SCORE: f32 = 10.0;

/// A rateable candidate (a movie, a show, ...).
///
/// Immutable once fetched. Sessions hold items behind `Arc` so queues
/// reference the same record instead of copying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub duration_minutes: u32,
    /// Average audience score on a 0-10 scale.
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

impl Item {
    /// Creates an item with the required attributes.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the id or title is blank
    /// - `OutOfRange` if the score is outside 0-10
    pub fn new(
        id: impl Into<ItemId>,
        title: impl Into<String>,
        category: impl Into<String>,
        duration_minutes: u32,
        score: f32,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let title = title.into();

        if id.as_str().trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if !(0.0..=MAX_SCORE).contains(&score) {
            return Err(ValidationError::out_of_range(
                "score",
                0,
                MAX_SCORE as i32,
                score.round() as i32,
            ));
        }

        Ok(Self {
            id,
            title,
            category: category.into(),
            duration_minutes,
            score,
            description: None,
            year: None,
            poster_url: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = Some(url.into());
        self
    }

    /// Title key used to spot the same entry arriving from two sub-sources.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }

    /// One-line display form, e.g. `Drama • 47min • ⭐ 9.5`.
    pub fn summary_line(&self) -> String {
        format!(
            "{} • {}min • ⭐ {:.1}",
            self.category, self.duration_minutes, self.score
        )
    }
}
