//! Pyramid descriptor format.
//!
//! [`Descriptor`] is the serde model of the JSON document a tile server
//! publishes for each image; [`validate_descriptor`] rejects documents the
//! engine cannot work with.

mod descriptor;
mod validation;

pub use descriptor::{Descriptor, LevelDescriptor, Thumbnail};
pub use validation::{validate_descriptor, ValidationResult};
