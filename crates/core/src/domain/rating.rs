use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Per-bucket multipliers for the trending score: only 3, 4 and 5 star reviews count.
pub const SCORE_WEIGHTS: [u64; RatingHistogram::BUCKETS] = [0, 0, 0, 3, 5, 8];

/// A whole-star rating in `0..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StarRating(u8);

impl StarRating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if value > Self::MAX {
            return Err(out_of_range(&value.to_string()));
        }
        Ok(Self(value))
    }

    /// Fractional values truncate toward zero, so `4.7` lands in the 4-star bucket.
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || !(0.0..=f64::from(Self::MAX)).contains(&value) {
            return Err(out_of_range(&value.to_string()));
        }
        Ok(Self(value.trunc() as u8))
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::missing("rating"));
        }
        let value = trimmed.parse::<f64>().map_err(|_| DomainError::Validation {
            field: "rating",
            message: format!("`{trimmed}` is not a number"),
        })?;
        Self::from_f64(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn bucket(self) -> usize {
        usize::from(self.0)
    }
}

fn out_of_range(raw: &str) -> DomainError {
    DomainError::Validation {
        field: "rating",
        message: format!("`{raw}` is outside the 0..=5 star range"),
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw rating as clients send it: a JSON number or a numeric string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Number(f64),
    Text(String),
}

impl RatingInput {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    pub fn to_star_rating(&self) -> Result<StarRating, DomainError> {
        match self {
            Self::Number(value) => StarRating::from_f64(*value),
            Self::Text(text) => StarRating::parse(text),
        }
    }
}

impl Serialize for StarRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StarRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RatingInput::deserialize(deserializer)?.to_star_rating().map_err(de::Error::custom)
    }
}

/// Review counts per star bucket. Serialized as `{"0": n, ..., "5": n}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RatingHistogram([u64; RatingHistogram::BUCKETS]);

impl RatingHistogram {
    pub const BUCKETS: usize = 6;

    pub fn from_counts(counts: [u64; Self::BUCKETS]) -> Self {
        Self(counts)
    }

    pub fn counts(&self) -> [u64; Self::BUCKETS] {
        self.0
    }

    pub fn count(&self, rating: StarRating) -> u64 {
        self.0[rating.bucket()]
    }

    pub fn record(&mut self, rating: StarRating) {
        self.0[rating.bucket()] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn weighted_score(&self) -> u64 {
        self.0.iter().zip(SCORE_WEIGHTS).map(|(count, weight)| count * weight).sum()
    }
}

impl Serialize for RatingHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<String, u64> =
            self.0.iter().enumerate().map(|(bucket, count)| (bucket.to_string(), *count)).collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RatingHistogram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Ingested documents carry keys like "4.0" as well as "4".
        let raw = BTreeMap::<String, u64>::deserialize(deserializer)?;
        let mut counts = [0u64; Self::BUCKETS];
        for (key, count) in raw {
            let rating = StarRating::parse(&key).map_err(de::Error::custom)?;
            counts[rating.bucket()] += count;
        }
        Ok(Self(counts))
    }
}
