// mediacheck - Library Entry Point
//
// Audits a photo/video collection against a cached exiftool snapshot:
// timestamps, GPS, and timezone offsets, with optional tag fixes.

pub mod constants;
pub mod error;
pub mod tools;
pub mod tags;
pub mod db;
pub mod metadata;
pub mod geo;
pub mod check;
pub mod config;
pub mod reconcile;
pub mod refresh;

pub use check::{check_media, CheckSession, Diagnostic, Fix};
pub use config::{InclusionPolicy, PolicyConfig};
pub use error::{MediaCheckError, Result};
pub use reconcile::{check_all, reconcile, CheckOptions, ReconcileReport};
pub use refresh::refresh;
