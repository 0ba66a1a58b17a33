//! Project configuration: settings and URL assembly.

pub mod settings;
pub mod urls;

pub use settings::Settings;
