use std::collections::BTreeMap;

use wayfare_core::domain::attraction::{Attraction, Region};

use crate::repositories::{AttractionRepository, RepositoryError};

/// Demo attractions bundled with the binary, in the same document shape the crawler ingests.
pub struct DemoDataset;

impl DemoDataset {
    pub const JSON: &str = include_str!("../../../config/fixtures/demo_attractions.json");

    pub fn attractions() -> Result<Vec<Attraction>, RepositoryError> {
        parse_attractions(Self::JSON)
    }

    pub async fn load(repo: &dyn AttractionRepository) -> Result<SeedResult, RepositoryError> {
        seed(repo, Self::attractions()?).await
    }
}

pub fn parse_attractions(json: &str) -> Result<Vec<Attraction>, RepositoryError> {
    serde_json::from_str(json)
        .map_err(|error| RepositoryError::Decode(format!("invalid attraction fixture: {error}")))
}

/// Saves every attraction and the regions they reference. Saving is an upsert, so reloading
/// the same documents is idempotent.
///
/// Every document is checked before the first write, so a rejected batch leaves the store as
/// it was.
pub async fn seed(
    repo: &dyn AttractionRepository,
    attractions: Vec<Attraction>,
) -> Result<SeedResult, RepositoryError> {
    for attraction in &attractions {
        attraction.check_consistency().map_err(|error| {
            RepositoryError::Constraint(format!("attraction `{}`: {error}", attraction.name))
        })?;
    }

    let mut regions = BTreeMap::new();
    for attraction in &attractions {
        regions.entry(attraction.region.clone()).or_insert_with(|| attraction.country.clone());
    }

    let attractions_seeded = attractions.len();
    for attraction in attractions {
        repo.save(attraction).await?;
    }
    let regions_seeded = regions.len();
    for (name, country) in regions {
        repo.save_region(Region { name, country }).await?;
    }

    tracing::info!(
        event_name = "db.fixtures.seeded",
        attractions = attractions_seeded,
        regions = regions_seeded,
        "attraction fixtures seeded"
    );
    Ok(SeedResult { attractions_seeded, regions_seeded })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub attractions_seeded: usize,
    pub regions_seeded: usize,
}
