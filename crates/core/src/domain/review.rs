use serde::{Deserialize, Serialize};

use crate::clock::{period_label, Clock};
use crate::domain::rating::{RatingInput, StarRating};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub username: String,
    pub rating: StarRating,
    pub title: String,
    pub content: String,
    #[serde(rename = "type_trip", alias = "trip_type", default, skip_serializing_if = "Option::is_none")]
    pub trip_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Review as submitted over the wire; every field is optional until validated.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewSubmission {
    pub attraction: Option<String>,
    pub username: Option<String>,
    pub rating: Option<RatingInput>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "type_trip")]
    pub trip_type: Option<String>,
    pub time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedReview {
    pub attraction: String,
    pub review: ReviewRecord,
}

impl ReviewSubmission {
    /// Checks presence of every required field before looking at the rating's value.
    pub fn validate(self, clock: &dyn Clock) -> Result<ValidatedReview, DomainError> {
        let attraction = required("attraction", self.attraction)?;
        let username = required("username", self.username)?;
        let rating = match self.rating {
            Some(input) if !input.is_blank() => input,
            _ => return Err(DomainError::missing("rating")),
        };
        let title = required("title", self.title)?;
        let content = required("content", self.content)?;
        let rating = rating.to_star_rating()?;

        let time = optional(self.time).unwrap_or_else(|| period_label(clock.now()));

        Ok(ValidatedReview {
            attraction,
            review: ReviewRecord {
                username,
                rating,
                title,
                content,
                trip_type: optional(self.trip_type),
                time: Some(time),
            },
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, DomainError> {
    optional(value).ok_or_else(|| DomainError::missing(field))
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}
