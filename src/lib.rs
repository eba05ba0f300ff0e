//! Upgrading skaffold configuration documents to the latest schema.
//!
//! A document written against any supported `apiVersion` is decoded strictly
//! at that version and walked through the chain of upgrades, one version at a
//! time, until it reaches [`schema::LATEST`]. Profiles are then selected and
//! overlaid, and unset fields get their defaults.

pub mod config;
pub mod defaults;
pub mod loader;
pub mod overlay;
pub mod patch;
pub mod profiles;
pub mod schema;
pub mod validation;

pub use loader::{load, load_bytes, LoadOptions, Loaded};
pub use schema::{parse_and_upgrade, Upgraded, Warning};
