use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use wayfare_core::domain::attraction::{Attraction, Region};
use wayfare_core::domain::rating::{RatingHistogram, StarRating};
use wayfare_core::domain::review::ReviewRecord;

use super::{AppendOutcome, AttractionRepository, RepositoryError};
use crate::DbPool;

/// One statement per bucket so the increment stays a single atomic `UPDATE`.
const INCREMENT_BUCKET: [&str; RatingHistogram::BUCKETS] = [
    "UPDATE attraction SET review_count = review_count + 1, bucket_0 = bucket_0 + 1, updated_at = datetime('now') WHERE name = ?",
    "UPDATE attraction SET review_count = review_count + 1, bucket_1 = bucket_1 + 1, updated_at = datetime('now') WHERE name = ?",
    "UPDATE attraction SET review_count = review_count + 1, bucket_2 = bucket_2 + 1, updated_at = datetime('now') WHERE name = ?",
    "UPDATE attraction SET review_count = review_count + 1, bucket_3 = bucket_3 + 1, updated_at = datetime('now') WHERE name = ?",
    "UPDATE attraction SET review_count = review_count + 1, bucket_4 = bucket_4 + 1, updated_at = datetime('now') WHERE name = ?",
    "UPDATE attraction SET review_count = review_count + 1, bucket_5 = bucket_5 + 1, updated_at = datetime('now') WHERE name = ?",
];

pub struct SqlAttractionRepository {
    pool: DbPool,
}

impl SqlAttractionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AttractionRepository for SqlAttractionRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Attraction>, RepositoryError> {
        let row = sqlx::query(
            "SELECT name, region, country, rating, tag, url, image, review_count,
                    bucket_0, bucket_1, bucket_2, bucket_3, bucket_4, bucket_5, weight
             FROM attraction WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut attraction = attraction_from_row(&row)?;

        let review_rows = sqlx::query(
            "SELECT username, rating, title, content, trip_type, time_label
             FROM attraction_review
             WHERE attraction_name = ?
             ORDER BY id DESC",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        attraction.reviews = review_rows.iter().map(review_from_row).collect::<Result<_, _>>()?;

        Ok(Some(attraction))
    }

    async fn list_by_region(
        &self,
        region: &str,
        limit: u32,
    ) -> Result<Vec<Attraction>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT name, region, country, rating, tag, url, image, review_count,
                    bucket_0, bucket_1, bucket_2, bucket_3, bucket_4, bucket_5, weight
             FROM attraction
             WHERE region = ?
             ORDER BY rowid ASC
             LIMIT ?",
        )
        .bind(region)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attraction_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Attraction>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT name, region, country, rating, tag, url, image, review_count,
                    bucket_0, bucket_1, bucket_2, bucket_3, bucket_4, bucket_5, weight
             FROM attraction
             ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attraction_from_row).collect()
    }

    async fn append_review(
        &self,
        name: &str,
        review: ReviewRecord,
    ) -> Result<AppendOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(INCREMENT_BUCKET[review.rating.bucket()])
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(AppendOutcome::NotFound);
        }

        sqlx::query(
            "INSERT INTO attraction_review
                (attraction_name, username, rating, title, content, trip_type, time_label)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(&review.username)
        .bind(i64::from(review.rating.value()))
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.trip_type.as_deref())
        .bind(review.time.as_deref())
        .execute(&mut *tx)
        .await?;

        let review_count: i64 =
            sqlx::query_scalar("SELECT review_count FROM attraction WHERE name = ?")
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(AppendOutcome::Appended { review_count: to_u64("review_count", review_count)? })
    }

    async fn save(&self, attraction: Attraction) -> Result<(), RepositoryError> {
        attraction
            .check_consistency()
            .map_err(|error| RepositoryError::Constraint(error.to_string()))?;
        let counts = attraction.histogram.counts();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO attraction (name, region, country, rating, tag, url, image, review_count,
                                     bucket_0, bucket_1, bucket_2, bucket_3, bucket_4, bucket_5,
                                     weight)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 region = excluded.region,
                 country = excluded.country,
                 rating = excluded.rating,
                 tag = excluded.tag,
                 url = excluded.url,
                 image = excluded.image,
                 review_count = excluded.review_count,
                 bucket_0 = excluded.bucket_0,
                 bucket_1 = excluded.bucket_1,
                 bucket_2 = excluded.bucket_2,
                 bucket_3 = excluded.bucket_3,
                 bucket_4 = excluded.bucket_4,
                 bucket_5 = excluded.bucket_5,
                 weight = excluded.weight,
                 updated_at = datetime('now')",
        )
        .bind(&attraction.name)
        .bind(&attraction.region)
        .bind(&attraction.country)
        .bind(&attraction.rating)
        .bind(&attraction.tag)
        .bind(&attraction.url)
        .bind(&attraction.image)
        .bind(to_i64("review_count", attraction.review_count)?)
        .bind(to_i64("bucket_0", counts[0])?)
        .bind(to_i64("bucket_1", counts[1])?)
        .bind(to_i64("bucket_2", counts[2])?)
        .bind(to_i64("bucket_3", counts[3])?)
        .bind(to_i64("bucket_4", counts[4])?)
        .bind(to_i64("bucket_5", counts[5])?)
        .bind(attraction.weight)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM attraction_review WHERE attraction_name = ?")
            .bind(&attraction.name)
            .execute(&mut *tx)
            .await?;

        // Oldest first so ascending ids keep the newest review on top.
        for review in attraction.reviews.iter().rev() {
            sqlx::query(
                "INSERT INTO attraction_review
                    (attraction_name, username, rating, title, content, trip_type, time_label)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&attraction.name)
            .bind(&review.username)
            .bind(i64::from(review.rating.value()))
            .bind(&review.title)
            .bind(&review.content)
            .bind(review.trip_type.as_deref())
            .bind(review.time.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, RepositoryError> {
        let rows = sqlx::query("SELECT name, country FROM region ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(Region { name: row.try_get("name")?, country: row.try_get("country")? }))
            .collect()
    }

    async fn save_region(&self, region: Region) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO region (name, country) VALUES (?, ?)
             ON CONFLICT(name) DO UPDATE SET country = excluded.country",
        )
        .bind(&region.name)
        .bind(&region.country)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn attraction_from_row(row: &SqliteRow) -> Result<Attraction, RepositoryError> {
    let mut counts = [0u64; RatingHistogram::BUCKETS];
    for (bucket, slot) in counts.iter_mut().enumerate() {
        let column = format!("bucket_{bucket}");
        *slot = to_u64(&column, row.try_get(column.as_str())?)?;
    }

    Ok(Attraction {
        name: row.try_get("name")?,
        region: row.try_get("region")?,
        country: row.try_get("country")?,
        rating: row.try_get("rating")?,
        tag: row.try_get("tag")?,
        url: row.try_get("url")?,
        image: row.try_get("image")?,
        review_count: to_u64("review_count", row.try_get("review_count")?)?,
        histogram: RatingHistogram::from_counts(counts),
        reviews: Vec::new(),
        weight: row.try_get("weight")?,
    })
}

fn review_from_row(row: &SqliteRow) -> Result<ReviewRecord, RepositoryError> {
    let raw_rating: i64 = row.try_get("rating")?;
    let rating = u8::try_from(raw_rating)
        .ok()
        .and_then(|value| StarRating::new(value).ok())
        .ok_or_else(|| RepositoryError::Decode(format!("invalid review rating `{raw_rating}`")))?;

    Ok(ReviewRecord {
        username: row.try_get("username")?,
        rating,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        trip_type: row.try_get("trip_type")?,
        time: row.try_get("time_label")?,
    })
}

fn to_u64(column: &str, value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value).map_err(|_| {
        RepositoryError::Decode(format!("invalid value for `{column}` (expected non-negative): {value}"))
    })
}

fn to_i64(column: &str, value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|_| {
        RepositoryError::Decode(format!("value for `{column}` does not fit in i64: {value}"))
    })
}
