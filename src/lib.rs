//! Media-review catalog API.
//!
//! Readers sign up with a username and email, confirm ownership of the
//! address with an emailed code, and exchange it for a bearer token.
//! Titles are organized by category and genre; authenticated users
//! review titles (one review each, scored 0-10) and comment on reviews.
//! A title's rating is the mean of its review scores.

pub mod apps;
pub mod auth;
pub mod config;
pub mod db;
pub mod exceptions;
pub mod http;
pub mod mail;
pub mod pagination;
pub mod routing;
pub mod server;
pub mod state;

pub use config::Settings;
pub use state::AppState;
