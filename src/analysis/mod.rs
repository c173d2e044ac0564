/// Per-frame signal reduction for the crowd monitoring service.
///
/// This module turns the motion extractor's output into the scalar signals
/// the risk classifier works on. Pixel-level work (differencing, blurring,
/// contour extraction) happens upstream and never reaches this crate.
///
/// Submodules:
/// - `motion` — reduces a region list into total motion area and density.

pub mod motion;
