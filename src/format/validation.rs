//! Structural validation of pyramid descriptors.
//!
//! A descriptor is rejected when the engine could not place a single tile
//! from it: no levels, zero-sized images or tiles, or ratios that cannot be
//! divided by. Softer inconsistencies (grid counts that do not match the
//! level size) are reported as warnings.

use crate::error::DescriptorError;

use super::descriptor::Descriptor;

/// Result of validating a descriptor.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Fatal problems; the first one becomes the returned error
    pub errors: Vec<DescriptorError>,

    /// Non-fatal issues
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn invalid(&mut self, field: &'static str, message: String) {
        self.errors.push(DescriptorError::Invalid { field, message });
    }

    /// Return the first error, if any.
    pub fn into_result(self) -> Result<(), DescriptorError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validate a parsed descriptor.
pub fn validate_descriptor(descriptor: &Descriptor) -> ValidationResult {
    let mut result = ValidationResult::default();

    if descriptor.width == 0 || descriptor.height == 0 {
        result.invalid(
            "width/height",
            format!(
                "image must be non-empty, got {}x{}",
                descriptor.width, descriptor.height
            ),
        );
    }

    if descriptor.levels.is_empty() {
        result.invalid("levels", "descriptor lists no zoom levels".to_string());
        return result;
    }

    for (index, level) in descriptor.levels.iter().enumerate() {
        if !level.ratio.is_finite() || level.ratio <= 0.0 {
            result.invalid(
                "levels.ratio",
                format!("level {} has unusable ratio {}", index, level.ratio),
            );
        }

        if level.width == 0 || level.height == 0 {
            result.invalid(
                "levels.width/height",
                format!(
                    "level {} is empty ({}x{})",
                    index, level.width, level.height
                ),
            );
        }

        if level.num_rows == 0 || level.num_cols == 0 {
            result.invalid(
                "levels.numRows/numCols",
                format!(
                    "level {} has an empty grid ({} rows x {} cols)",
                    index, level.num_rows, level.num_cols
                ),
            );
        }

        let (tile_width, tile_height) = descriptor.level_tile_size(level);
        if tile_width == 0 || tile_height == 0 {
            result.invalid(
                "tileWidth/tileHeight",
                format!(
                    "level {} has zero tile size ({}x{})",
                    index, tile_width, tile_height
                ),
            );
            continue;
        }

        let expected_cols = level.width.div_ceil(tile_width);
        let expected_rows = level.height.div_ceil(tile_height);
        if level.width > 0 && level.num_cols != expected_cols {
            result.warnings.push(format!(
                "level {}: {} cols listed, {} px / {} px tiles implies {}",
                index, level.num_cols, level.width, tile_width, expected_cols
            ));
        }
        if level.height > 0 && level.num_rows != expected_rows {
            result.warnings.push(format!(
                "level {}: {} rows listed, {} px / {} px tiles implies {}",
                index, level.num_rows, level.height, tile_height, expected_rows
            ));
        }
    }

    result
}
