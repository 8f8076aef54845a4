pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ranking;
pub mod recommendation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::attraction::{Attraction, Region};
pub use domain::rating::{RatingHistogram, RatingInput, StarRating};
pub use domain::review::{ReviewRecord, ReviewSubmission, ValidatedReview};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use ranking::{ScoreSource, TrendingEngine, TrendingEntry};
pub use recommendation::{parse_live_batch, LiveBatchError, Recommendation, RecommendationSource};
