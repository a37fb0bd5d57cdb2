//! Pre-submit validation of merged video options.
//!
//! Called by [`VideoModel`](crate::video::model::VideoModel) after merging the
//! caller's options over the defaults, so malformed requests fail loudly
//! before any network round-trip.

use crate::error::{Result, ScopeError};
use crate::video::options::VideoOptions;

/// Validate `options` for submission to `model`.
pub fn validate_video_options(model: &str, options: &VideoOptions) -> Result<()> {
    if model.trim().is_empty() {
        return Err(ScopeError::InvalidRequest(
            "Video model cannot be empty".to_string(),
        ));
    }
    require_bbox(model, "face_bbox", options.input.face_bbox.as_deref())?;
    require_bbox(model, "ext_bbox", options.input.ext_bbox.as_deref())?;

    match options.parameters.duration {
        Some(duration) if duration <= 0 => Err(ScopeError::InvalidRequest(format!(
            "Option 'duration' for model '{}' must be > 0, got {}",
            model, duration
        ))),
        _ => Ok(()),
    }
}

/// A bounding box, when present, is exactly `[x1, y1, x2, y2]`.
fn require_bbox(model: &str, key: &str, bbox: Option<&[i64]>) -> Result<()> {
    match bbox {
        Some(values) if values.len() != 4 => Err(ScopeError::InvalidRequest(format!(
            "Option '{}' for model '{}' must have 4 entries, got {}",
            key,
            model,
            values.len()
        ))),
        _ => Ok(()),
    }
}
