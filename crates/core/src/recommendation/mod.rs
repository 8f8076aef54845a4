use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::attraction::Attraction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Live,
    Backup,
}

/// A recommended place in the shape returned to clients, whichever path produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub rating: String,
    pub tag: String,
    pub url: String,
    pub image: String,
    pub region: String,
}

impl From<&Attraction> for Recommendation {
    fn from(attraction: &Attraction) -> Self {
        Self {
            name: attraction.name.clone(),
            rating: attraction.rating.clone(),
            tag: attraction.tag.clone(),
            url: attraction.url.clone(),
            image: attraction.image.clone(),
            region: attraction.region.clone(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LiveBatchError {
    #[error("worker output is not valid JSON: {0}")]
    Malformed(String),
    #[error("worker output is not a JSON array")]
    NotAnArray,
    #[error("worker item {0} is not a JSON object")]
    NonObjectItem(usize),
    #[error("worker returned no recommendations")]
    Empty,
    #[error("first worker recommendation has no image")]
    MissingImage,
}

/// Parses the worker's stdout and applies the acceptance gate: a non-empty array whose
/// first item carries an image.
pub fn parse_live_batch(stdout: &str) -> Result<Vec<Recommendation>, LiveBatchError> {
    let value: Value = serde_json::from_str(stdout.trim())
        .map_err(|error| LiveBatchError::Malformed(error.to_string()))?;
    let Value::Array(items) = value else {
        return Err(LiveBatchError::NotAnArray);
    };

    let recommendations = items
        .iter()
        .enumerate()
        .map(|(index, item)| item.as_object().map(normalize).ok_or(LiveBatchError::NonObjectItem(index)))
        .collect::<Result<Vec<_>, _>>()?;

    match recommendations.first() {
        None => Err(LiveBatchError::Empty),
        Some(first) if first.image.trim().is_empty() => Err(LiveBatchError::MissingImage),
        Some(_) => Ok(recommendations),
    }
}

fn normalize(item: &Map<String, Value>) -> Recommendation {
    Recommendation {
        name: text_field(item, &["name"]),
        rating: text_field(item, &["rating"]),
        tag: text_field(item, &["tag"]),
        url: text_field(item, &["url"]),
        image: text_field(item, &["image"]),
        region: text_field(item, &["region", "state"]),
    }
}

fn text_field(item: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| match item.get(*key) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{parse_live_batch, LiveBatchError, Recommendation};
    use crate::domain::attraction::Attraction;

    #[test]
    fn accepts_scraper_output_and_normalizes_shape() {
        let stdout = r#"
        [
            {"name": "Tam Thanh Beach", "rating": "4.5", "tag": "Beaches",
             "url": "/Attraction_Review-g1-d2", "image": "https://cdn.example/tam-thanh.jpg",
             "state": "Tam Ky"},
            {"name": "Ban Co Peak", "rating": 4, "image": ""}
        ]
        "#;

        let batch = parse_live_batch(stdout).expect("live batch accepted");

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].region, "Tam Ky");
        assert_eq!(batch[0].tag, "Beaches");
        assert_eq!(batch[1].rating, "4");
        assert_eq!(batch[1].tag, "");
    }

    #[test]
    fn gate_rejects_empty_batches_and_missing_first_image() {
        assert_eq!(parse_live_batch("[]"), Err(LiveBatchError::Empty));
        assert_eq!(
            parse_live_batch(r#"[{"name": "No Photo", "image": "  "}, {"image": "x.jpg"}]"#),
            Err(LiveBatchError::MissingImage)
        );
        assert_eq!(parse_live_batch(r#"[{"name": "No Photo"}]"#), Err(LiveBatchError::MissingImage));
    }

    #[test]
    fn gate_rejects_non_array_and_malformed_output() {
        assert_eq!(parse_live_batch(r#"{"name": "x"}"#), Err(LiveBatchError::NotAnArray));
        assert_eq!(parse_live_batch(r#"["x"]"#), Err(LiveBatchError::NonObjectItem(0)));
        assert!(matches!(parse_live_batch("Traceback (most recent"), Err(LiveBatchError::Malformed(_))));
        assert!(matches!(parse_live_batch(""), Err(LiveBatchError::Malformed(_))));
    }

    #[test]
    fn backup_projection_drops_reviews_and_counts() {
        let mut attraction = Attraction::new("Marble Mountains", "Da Nang").with_histogram([0, 0, 0, 1, 2, 3]);
        attraction.image = "https://cdn.example/marble.jpg".to_string();

        let recommendation = Recommendation::from(&attraction);
        let encoded = serde_json::to_value(&recommendation).expect("encode");

        assert_eq!(recommendation.region, "Da Nang");
        assert!(encoded.get("histogram").is_none());
        assert!(encoded.get("reviews").is_none());
    }
}
