//! Metadata extraction and field sanitation.
//!
//! The probe entry point prints a loosely structured `key : value` dump on
//! its diagnostic stream. [`extract`] captures that dump into the scratch
//! workspace and returns a [`MetadataSnapshot`] to look values up in;
//! [`sanitize`] and [`sanitize_title`] turn raw values into strings that are
//! safe as path components and container tags.

mod extractor;
mod sanitize;

pub use extractor::{extract, MetadataSnapshot};
pub use sanitize::{sanitize, sanitize_title};
