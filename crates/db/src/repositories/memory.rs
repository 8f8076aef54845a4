use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use wayfare_core::domain::attraction::{Attraction, Region};
use wayfare_core::domain::review::ReviewRecord;

use super::{AppendOutcome, AttractionRepository, RepositoryError};

#[derive(Default)]
struct AttractionTable {
    rows: Vec<Attraction>,
    index: HashMap<String, usize>,
}

#[derive(Default)]
pub struct InMemoryAttractionRepository {
    attractions: RwLock<AttractionTable>,
    regions: RwLock<BTreeMap<String, Region>>,
}

impl InMemoryAttractionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn without_reviews(attraction: &Attraction) -> Attraction {
    Attraction { reviews: Vec::new(), ..attraction.clone() }
}

#[async_trait::async_trait]
impl AttractionRepository for InMemoryAttractionRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Attraction>, RepositoryError> {
        let table = self.attractions.read().await;
        Ok(table.index.get(name).map(|&slot| table.rows[slot].clone()))
    }

    async fn list_by_region(
        &self,
        region: &str,
        limit: u32,
    ) -> Result<Vec<Attraction>, RepositoryError> {
        let table = self.attractions.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|attraction| attraction.region == region)
            .take(limit as usize)
            .map(without_reviews)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Attraction>, RepositoryError> {
        let table = self.attractions.read().await;
        Ok(table.rows.iter().map(without_reviews).collect())
    }

    async fn append_review(
        &self,
        name: &str,
        review: ReviewRecord,
    ) -> Result<AppendOutcome, RepositoryError> {
        let mut table = self.attractions.write().await;
        let Some(&slot) = table.index.get(name) else {
            return Ok(AppendOutcome::NotFound);
        };

        let mut updated = table.rows[slot].clone();
        updated.apply_review(review);
        updated
            .check_consistency()
            .map_err(|error| RepositoryError::Constraint(error.to_string()))?;

        let review_count = updated.review_count;
        table.rows[slot] = updated;
        Ok(AppendOutcome::Appended { review_count })
    }

    async fn save(&self, attraction: Attraction) -> Result<(), RepositoryError> {
        attraction
            .check_consistency()
            .map_err(|error| RepositoryError::Constraint(error.to_string()))?;

        let mut table = self.attractions.write().await;
        match table.index.get(&attraction.name) {
            Some(&slot) => table.rows[slot] = attraction,
            None => {
                let slot = table.rows.len();
                table.index.insert(attraction.name.clone(), slot);
                table.rows.push(attraction);
            }
        }
        Ok(())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, RepositoryError> {
        let regions = self.regions.read().await;
        Ok(regions.values().cloned().collect())
    }

    async fn save_region(&self, region: Region) -> Result<(), RepositoryError> {
        let mut regions = self.regions.write().await;
        regions.insert(region.name.clone(), region);
        Ok(())
    }
}
