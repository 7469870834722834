//! Consistency validation for the analytics dashboard dataset.
//!
//! The dataset (key metrics, distributions, age splits, rankings...) is loaded
//! by [`data`], checked by [`verify`], summarized by [`figures`] and rendered
//! by [`report`].

pub mod config;
pub mod data;
pub mod figures;
pub mod logging;
pub mod report;
pub mod verify;

pub use config::{Config, OutputFormat, Tolerances};
pub use data::Datasets;
pub use verify::{validate, validate_loaded, CheckId, Finding, Severity, ValidationReport};
