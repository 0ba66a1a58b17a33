//! User accounts, roles, and the signup/token flow.

pub mod models;
pub mod serializers;
pub mod urls;
pub mod views;
