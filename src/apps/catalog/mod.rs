//! Catalog: categories, genres, and titles with derived ratings.

pub mod models;
pub mod serializers;
pub mod urls;
pub mod views;
