//! Domain applications: users, catalog, reviews.

pub mod catalog;
pub mod reviews;
pub mod users;
