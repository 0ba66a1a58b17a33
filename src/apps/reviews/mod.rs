//! Reviews and their comments, nested under titles.

pub mod models;
pub mod serializers;
pub mod urls;
pub mod views;
