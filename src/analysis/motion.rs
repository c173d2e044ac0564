//! Motion metrics aggregation.
//!
//! Reduces the candidate regions of one frame into `FrameMetrics`. Regions
//! whose area does not strictly exceed `min_contour_area` are noise and are
//! dropped whole. Region order is irrelevant.

use crate::model::{ConfigError, FrameGeometry, FrameMetrics, InputError, MotionRegion};

/// Result of aggregating one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSummary {
    pub metrics: FrameMetrics,
    /// Regions that passed the noise filter.
    pub counted_regions: usize,
    /// Malformed regions that were treated as zero contribution.
    pub rejected: Vec<InputError>,
}

/// Checks a single region. Negative and non-finite areas are rejected.
pub fn validate_region(region: &MotionRegion) -> Result<f64, InputError> {
    if !region.area.is_finite() {
        Err(InputError::NonFiniteArea(region.area))
    } else if region.area < 0.0 {
        Err(InputError::NegativeArea(region.area))
    } else {
        Ok(region.area)
    }
}

/// Sums the areas of valid regions strictly above `min_contour_area` and
/// normalizes by frame area.
///
/// Fails only when the frame has no area, which is a deployment error.
pub fn aggregate(
    regions: &[MotionRegion],
    geometry: FrameGeometry,
    min_contour_area: f64,
) -> Result<MotionSummary, ConfigError> {
    let frame_area = geometry.area();
    if frame_area <= 0.0 {
        return Err(ConfigError::NonPositiveFrameArea {
            width: geometry.width,
            height: geometry.height,
        });
    }

    let mut total_motion_area = 0.0;
    let mut counted_regions = 0;
    let mut rejected = Vec::new();

    for region in regions {
        match validate_region(region) {
            Ok(area) if area > min_contour_area => {
                total_motion_area += area;
                counted_regions += 1;
            }
            Ok(_) => {}
            Err(e) => rejected.push(e),
        }
    }

    Ok(MotionSummary {
        metrics: FrameMetrics {
            total_motion_area,
            density: total_motion_area / frame_area,
        },
        counted_regions,
        rejected,
    })
}
