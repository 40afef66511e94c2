//! Physical feature ranges used for normalization.
//!
//! A [`FeatureRange`] is built exactly once, when an encoder is
//! constructed at episode start, and is immutable afterwards. Lane-count
//! changes during an episode are therefore not reflected in the
//! normalization bounds.

use indexmap::IndexMap;

use lanesight_core::{Feature, ObsError, Scene};

use crate::normalize::{lmap, lmap_clipped};

/// Road geometry facts that determine default normalization bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadFacts {
    /// Number of lanes on the ego vehicle's segment.
    pub lanes_count: usize,
    /// Lane width in metres.
    pub lane_width: f64,
}

impl RoadFacts {
    /// Read the facts from the scene's current road around the ego vehicle.
    pub fn from_scene(scene: &dyn Scene) -> Self {
        let road = scene.road();
        Self {
            lanes_count: road.side_lanes(&scene.ego().lane_index()).len(),
            lane_width: road.lane_width(),
        }
    }
}

/// Ordered mapping from feature to its physical `[low, high]` bounds.
///
/// Features absent from the range pass through normalization unchanged.
///
/// # Examples
///
/// ```
/// use lanesight_core::Feature;
/// use lanesight_obs::range::{FeatureRange, RoadFacts};
///
/// let facts = RoadFacts { lanes_count: 4, lane_width: 4.0 };
/// let range = FeatureRange::kinematics(facts, 30.0);
/// assert_eq!(range.get(Feature::X), Some((-150.0, 150.0)));
/// assert_eq!(range.get(Feature::Y), Some((-16.0, 16.0)));
/// assert_eq!(range.normalize(Feature::Vx, 30.0, true), 0.5);
/// assert_eq!(range.normalize(Feature::Presence, 1.0, true), 1.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureRange {
    bounds: IndexMap<Feature, (f64, f64)>,
}

impl FeatureRange {
    /// An empty range (normalization is a no-op).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the bounds of one feature.
    pub fn with(mut self, feature: Feature, low: f64, high: f64) -> Self {
        self.bounds.insert(feature, (low, high));
        self
    }

    /// Validate user-supplied bounds.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] if any bound is non-finite or
    /// `low >= high`.
    pub fn from_config(bounds: &IndexMap<Feature, [f64; 2]>) -> Result<Self, ObsError> {
        let mut range = Self::new();
        for (&feature, &[low, high]) in bounds {
            if !low.is_finite() || !high.is_finite() {
                return Err(ObsError::config(format!(
                    "features_range[{feature}]: bounds must be finite, got [{low}, {high}]"
                )));
            }
            if low >= high {
                return Err(ObsError::config(format!(
                    "features_range[{feature}]: low ({low}) must be < high ({high})"
                )));
            }
            range.bounds.insert(feature, (low, high));
        }
        Ok(range)
    }

    /// Use `configured` bounds when present, otherwise build the default.
    pub fn resolve(
        configured: Option<&IndexMap<Feature, [f64; 2]>>,
        default: impl FnOnce() -> Self,
    ) -> Result<Self, ObsError> {
        match configured {
            Some(bounds) => Self::from_config(bounds),
            None => Ok(default()),
        }
    }

    /// Default bounds for the kinematic table: five seconds of travel at
    /// top speed longitudinally, the road width laterally, and twice the
    /// top speed for both velocity components.
    pub fn kinematics(facts: RoadFacts, speed_max: f64) -> Self {
        let half_width = facts.lane_width * facts.lanes_count as f64;
        Self::new()
            .with(Feature::X, -5.0 * speed_max, 5.0 * speed_max)
            .with(Feature::Y, -half_width, half_width)
            .with(Feature::Vx, -2.0 * speed_max, 2.0 * speed_max)
            .with(Feature::Vy, -2.0 * speed_max, 2.0 * speed_max)
    }

    /// Default bounds for the occupancy grid: velocities only, so cell
    /// indices are computed from raw positions.
    pub fn occupancy(speed_max: f64) -> Self {
        Self::new()
            .with(Feature::Vx, -2.0 * speed_max, 2.0 * speed_max)
            .with(Feature::Vy, -2.0 * speed_max, 2.0 * speed_max)
    }

    /// Default bounds for the lane-relative encoder.
    ///
    /// The lane-number span is widened to at least one so single-lane
    /// roads keep a non-degenerate range.
    pub fn lane_relative(facts: RoadFacts, speed_max: f64) -> Self {
        let last_lane = facts.lanes_count.saturating_sub(1).max(1) as f64;
        Self::new()
            .with(Feature::LaneIndex, 0.0, last_lane)
            .with(Feature::X, -5.0 * speed_max, 5.0 * speed_max)
            .with(Feature::Vx, -2.0 * speed_max, 2.0 * speed_max)
    }

    /// Bounds of `feature`, if normalized.
    pub fn get(&self, feature: Feature) -> Option<(f64, f64)> {
        self.bounds.get(&feature).copied()
    }

    /// Whether `feature` has bounds.
    pub fn contains(&self, feature: Feature) -> bool {
        self.bounds.contains_key(&feature)
    }

    /// Iterate bounds in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, (f64, f64))> + '_ {
        self.bounds.iter().map(|(&f, &b)| (f, b))
    }

    /// Map `value` of `feature` onto `[-1, 1]`, clamping when `clip`.
    /// Features without bounds are returned unchanged.
    pub fn normalize(&self, feature: Feature, value: f64, clip: bool) -> f64 {
        self.normalize_onto(feature, value, (-1.0, 1.0), clip)
    }

    /// Map `value` of `feature` onto an arbitrary target range.
    pub fn normalize_onto(&self, feature: Feature, value: f64, to: (f64, f64), clip: bool) -> f64 {
        match self.get(feature) {
            Some(from) if clip => lmap_clipped(value, from, to),
            Some(from) => lmap(value, from, to),
            None => value,
        }
    }

    /// Inverse of [`normalize`](Self::normalize) (without clipping).
    pub fn denormalize(&self, feature: Feature, value: f64) -> f64 {
        match self.get(feature) {
            Some(to) => lmap(value, (-1.0, 1.0), to),
            None => value,
        }
    }
}
