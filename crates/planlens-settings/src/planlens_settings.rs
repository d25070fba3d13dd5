//! PlanLens Settings - persistent user configuration
//!
//! Analysis service credentials, insight thresholds and the response locale,
//! stored as JSON in the user's config directory.

mod settings;
pub mod settings_file;

pub use settings::*;
