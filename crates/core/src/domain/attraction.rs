use serde::{Deserialize, Serialize};

use crate::domain::rating::RatingHistogram;
use crate::domain::review::ReviewRecord;
use crate::errors::DomainError;

/// Administrative area used to partition the trending ranking.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "state", alias = "name")]
    pub name: String,
    pub country: String,
}

/// A rated place. `name` is unique within its region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    #[serde(alias = "state")]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: String,
    #[serde(alias = "num_review", default)]
    pub review_count: u64,
    #[serde(alias = "review_score", default)]
    pub histogram: RatingHistogram,
    /// Newest first.
    #[serde(alias = "review", default)]
    pub reviews: Vec<ReviewRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Attraction {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            country: String::new(),
            rating: String::new(),
            tag: String::new(),
            url: String::new(),
            image: String::new(),
            review_count: 0,
            histogram: RatingHistogram::default(),
            reviews: Vec::new(),
            weight: None,
        }
    }

    pub fn with_histogram(mut self, counts: [u64; RatingHistogram::BUCKETS]) -> Self {
        self.histogram = RatingHistogram::from_counts(counts);
        self.review_count = self.histogram.total();
        self
    }

    /// Prepends the review and bumps the count and its histogram bucket together.
    pub fn apply_review(&mut self, review: ReviewRecord) {
        self.review_count += 1;
        self.histogram.record(review.rating);
        self.reviews.insert(0, review);
    }

    pub fn weighted_score(&self) -> u64 {
        self.histogram.weighted_score()
    }

    pub fn check_consistency(&self) -> Result<(), DomainError> {
        let total = self.histogram.total();
        if self.review_count != total {
            return Err(DomainError::InvariantViolation(format!(
                "attraction `{}` has review_count {} but histogram total {}",
                self.name, self.review_count, total
            )));
        }
        Ok(())
    }
}
