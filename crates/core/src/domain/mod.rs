pub mod attraction;
pub mod rating;
pub mod review;
