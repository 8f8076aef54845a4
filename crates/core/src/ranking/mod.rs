//! Trending ranking: one winner per region, ordered globally by weighted score.
//!
//! The histogram formula (`8×five + 5×four + 3×three`) is the canonical score. A precomputed
//! `weight` supplied by ingestion can be opted into with [`ScoreSource::Precomputed`]; entities
//! without one still fall back to the histogram.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::attraction::Attraction;

pub const DEFAULT_TRENDING_LIMIT: usize = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    #[default]
    Histogram,
    Precomputed,
}

/// Public projection of a ranked attraction; reviews and counts are left out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub name: String,
    pub region: String,
    pub rating: String,
    pub url: String,
    pub tag: String,
    pub image: String,
    pub score: f64,
}

impl TrendingEntry {
    fn from_attraction(attraction: &Attraction, score: f64) -> Self {
        Self {
            name: attraction.name.clone(),
            region: attraction.region.clone(),
            rating: attraction.rating.clone(),
            url: attraction.url.clone(),
            tag: attraction.tag.clone(),
            image: attraction.image.clone(),
            score,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendingEngine {
    limit: usize,
    source: ScoreSource,
}

impl Default for TrendingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TRENDING_LIMIT)
    }
}

impl TrendingEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit, source: ScoreSource::Histogram }
    }

    pub fn with_source(mut self, source: ScoreSource) -> Self {
        self.source = source;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn score(&self, attraction: &Attraction) -> f64 {
        let histogram_score = attraction.weighted_score() as f64;
        match self.source {
            ScoreSource::Histogram => histogram_score,
            ScoreSource::Precomputed => attraction.weight.unwrap_or(histogram_score),
        }
    }

    /// Picks the best attraction per region and returns the top `limit` winners.
    ///
    /// Ties, both inside a region and across winners, go to the attraction seen first in
    /// `attractions`, so the output is a pure function of the input order.
    pub fn rank<'a, I>(&self, attractions: I) -> Vec<TrendingEntry>
    where
        I: IntoIterator<Item = &'a Attraction>,
    {
        let mut winners: Vec<(usize, f64, &Attraction)> = Vec::new();
        let mut slot_by_region: HashMap<&str, usize> = HashMap::new();

        for (position, attraction) in attractions.into_iter().enumerate() {
            let score = self.score(attraction);
            match slot_by_region.get(attraction.region.as_str()) {
                Some(&slot) => {
                    if score > winners[slot].1 {
                        winners[slot] = (position, score, attraction);
                    }
                }
                None => {
                    slot_by_region.insert(attraction.region.as_str(), winners.len());
                    winners.push((position, score, attraction));
                }
            }
        }

        winners.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));
        winners
            .into_iter()
            .take(self.limit)
            .map(|(_, score, attraction)| TrendingEntry::from_attraction(attraction, score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreSource, TrendingEngine};
    use crate::domain::attraction::Attraction;

    fn scored(name: &str, region: &str, fives: u64) -> Attraction {
        Attraction::new(name, region).with_histogram([0, 0, 0, 0, 0, fives])
    }

    #[test]
    fn one_winner_per_region_in_descending_score_order() {
        // scores: 8 * fives
        let attractions = vec![
            scored("Hoi An Old Town", "Quang Nam", 5),
            scored("My Son", "Quang Nam", 9),
            scored("Ben Thanh", "Ho Chi Minh", 12),
            scored("Cu Chi", "Ho Chi Minh", 3),
            scored("Hoan Kiem", "Ha Noi", 11),
        ];

        let ranked = TrendingEngine::new(30).rank(&attractions);
        let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();
        let scores: Vec<f64> = ranked.iter().map(|entry| entry.score).collect();

        assert_eq!(names, vec!["Ben Thanh", "Hoan Kiem", "My Son"]);
        assert_eq!(scores, vec![96.0, 88.0, 72.0]);
    }

    #[test]
    fn winners_are_truncated_to_limit() {
        let attractions = vec![
            Attraction::new("C", "r3").with_histogram([0, 0, 0, 10, 0, 5]),
            Attraction::new("A", "r1").with_histogram([0, 0, 0, 0, 3, 10]),
            Attraction::new("B", "r2").with_histogram([0, 0, 0, 0, 18, 0]),
        ];

        let all: Vec<f64> =
            TrendingEngine::new(3).rank(&attractions).iter().map(|entry| entry.score).collect();
        assert_eq!(all, vec![95.0, 90.0, 70.0]);

        let ranked = TrendingEngine::new(2).rank(&attractions);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "A");
        assert_eq!(ranked[1].name, "B");
    }

    #[test]
    fn ties_resolve_by_input_order_within_and_across_regions() {
        let attractions = vec![
            scored("first-north", "north", 2),
            scored("first-south", "south", 4),
            scored("second-north", "north", 2),
            scored("east", "east", 4),
        ];

        let ranked = TrendingEngine::new(10).rank(&attractions);
        let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(names, vec!["first-south", "east", "first-north"]);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        let attractions: Vec<Attraction> = Vec::new();
        assert!(TrendingEngine::default().rank(&attractions).is_empty());
    }

    #[test]
    fn precomputed_weight_is_used_only_when_opted_in() {
        let mut weighted = scored("weighted", "r1", 1);
        weighted.weight = Some(250.5);
        let plain = scored("plain", "r2", 2);
        let attractions = vec![weighted, plain];

        let by_histogram = TrendingEngine::new(5).rank(&attractions);
        assert_eq!(by_histogram[0].name, "plain");

        let by_weight = TrendingEngine::new(5).with_source(ScoreSource::Precomputed).rank(&attractions);
        assert_eq!(by_weight[0].name, "weighted");
        assert_eq!(by_weight[0].score, 250.5);
        assert_eq!(by_weight[1].score, 16.0);
    }
}
