//! Encoder configuration.
//!
//! [`ObsConfig`] is a closed enum over encoder kinds, internally tagged
//! by `"type"` when (de)serialized. Each variant carries a plain struct
//! whose defaults match the reference environment, so configs can be
//! written as JSON or built in code with struct-update syntax.
//!
//! ```
//! use lanesight_obs::config::{KinematicsConfig, ObsConfig, ObsKind, VehicleOrder};
//!
//! let config = ObsConfig::from_json(r#"{"type": "Kinematics", "vehicles_count": 8}"#).unwrap();
//! assert_eq!(config.kind(), ObsKind::Kinematics);
//! assert_eq!(
//!     config,
//!     ObsConfig::Kinematics(KinematicsConfig { vehicles_count: 8, ..Default::default() })
//! );
//! # let _ = VehicleOrder::Sorted;
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use lanesight_core::{Feature, ObsError};

/// Per-feature `[low, high]` bounds as written in configuration.
pub type FeatureBounds = IndexMap<Feature, [f64; 2]>;

/// Row order of neighbouring vehicles in the kinematic table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleOrder {
    /// Nearest first.
    #[default]
    Sorted,
    /// Randomly permuted on every observation (ego row excluded).
    Shuffled,
}

fn default_kinematic_features() -> Vec<Feature> {
    vec![
        Feature::Presence,
        Feature::X,
        Feature::Y,
        Feature::Vx,
        Feature::Vy,
    ]
}

/// Options of the kinematic table encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Feature columns, in output order.
    pub features: Vec<Feature>,
    /// Number of rows, ego included.
    pub vehicles_count: usize,
    /// Normalization bounds; derived from the road when `None`.
    pub features_range: Option<FeatureBounds>,
    /// Keep neighbours in world coordinates instead of ego's frame.
    pub absolute: bool,
    /// Neighbour row order.
    pub order: VehicleOrder,
    /// Map features onto `[-1, 1]`.
    pub normalize: bool,
    /// Clamp normalized features into `[-1, 1]`.
    pub clip: bool,
    /// Include vehicles behind the ego vehicle.
    pub see_behind: bool,
    /// Populate the `cos_d` / `sin_d` intention features.
    pub observe_intentions: bool,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            features: default_kinematic_features(),
            vehicles_count: 5,
            features_range: None,
            absolute: false,
            order: VehicleOrder::Sorted,
            normalize: true,
            clip: true,
            see_behind: false,
            observe_intentions: false,
        }
    }
}

impl KinematicsConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if self.features.is_empty() {
            return Err(ObsError::config("Kinematics: features must not be empty"));
        }
        Ok(())
    }
}

/// Options of the occupancy grid encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyGridConfig {
    /// One grid layer per feature, in output order.
    pub features: Vec<Feature>,
    /// `[[x_low, x_high], [y_low, y_high]]` window around ego (m).
    pub grid_size: [[f64; 2]; 2],
    /// `[x_step, y_step]` cell size (m).
    pub grid_step: [f64; 2],
    /// Normalization bounds; velocities only when `None`.
    pub features_range: Option<FeatureBounds>,
    /// World-frame grid (not supported).
    pub absolute: bool,
}

impl Default for OccupancyGridConfig {
    fn default() -> Self {
        Self {
            features: vec![Feature::Presence, Feature::Vx, Feature::Vy],
            grid_size: [[-27.5, 27.5], [-27.5, 27.5]],
            grid_step: [5.0, 5.0],
            features_range: None,
            absolute: false,
        }
    }
}

impl OccupancyGridConfig {
    /// `(rows, cols)` of each layer: lateral cells by longitudinal cells.
    pub fn grid_shape(&self) -> (usize, usize) {
        let cells = |axis: usize| {
            let [lo, hi] = self.grid_size[axis];
            ((hi - lo) / self.grid_step[axis]).floor().max(0.0) as usize
        };
        (cells(1), cells(0))
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if self.features.is_empty() {
            return Err(ObsError::config("OccupancyGrid: features must not be empty"));
        }
        for (axis, name) in ["x", "y"].into_iter().enumerate() {
            let [lo, hi] = self.grid_size[axis];
            let step = self.grid_step[axis];
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(ObsError::config(format!(
                    "OccupancyGrid: grid_size[{name}] must be finite with low < high, got [{lo}, {hi}]"
                )));
            }
            if !step.is_finite() || step <= 0.0 {
                return Err(ObsError::config(format!(
                    "OccupancyGrid: grid_step[{name}] must be > 0, got {step}"
                )));
            }
        }
        let (rows, cols) = self.grid_shape();
        if rows == 0 || cols == 0 {
            return Err(ObsError::config(format!(
                "OccupancyGrid: grid has no cells ({rows}x{cols}); step exceeds window"
            )));
        }
        Ok(())
    }
}

/// Options of the time-to-collision grid encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeToCollisionConfig {
    /// Prediction horizon (s).
    pub horizon: f64,
}

impl Default for TimeToCollisionConfig {
    fn default() -> Self {
        Self { horizon: 10.0 }
    }
}

impl TimeToCollisionConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(ObsError::config(format!(
                "TimeToCollision: horizon must be > 0, got {}",
                self.horizon
            )));
        }
        Ok(())
    }
}

/// Options of the simplified lane-relative encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedKinematicsConfig {
    /// Normalization bounds for `lane_index`, `x` and `vx`.
    pub features_range: Option<FeatureBounds>,
    /// Lanes observed on each side of the ego lane.
    pub lanes_count: usize,
    /// Accepted for compatibility; the encoder is always ego-relative.
    pub absolute: bool,
    /// Map values onto their normalized ranges.
    pub normalize: bool,
    /// Clamp normalized values into `[-1, 1]`.
    pub clip: bool,
}

impl Default for SimplifiedKinematicsConfig {
    fn default() -> Self {
        Self {
            features_range: None,
            lanes_count: 1,
            absolute: false,
            normalize: true,
            clip: true,
        }
    }
}

impl SimplifiedKinematicsConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if let Some(bounds) = &self.features_range {
            for required in [Feature::LaneIndex, Feature::X, Feature::Vx] {
                if !bounds.contains_key(&required) {
                    return Err(ObsError::config(format!(
                        "SimplifiedKinematics: features_range is missing '{required}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Options of the goal-conditioned kinematic encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KinematicsGoalConfig {
    /// Feature columns of the ego and goal vectors.
    #[serde(default = "default_kinematic_features")]
    pub features: Vec<Feature>,
    /// Per-feature divisor, same length as `features`.
    pub scales: Vec<f64>,
}

impl KinematicsGoalConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if self.features.is_empty() {
            return Err(ObsError::config("KinematicsGoal: features must not be empty"));
        }
        if self.scales.len() != self.features.len() {
            return Err(ObsError::config(format!(
                "KinematicsGoal: {} scales for {} features",
                self.scales.len(),
                self.features.len()
            )));
        }
        if let Some(bad) = self.scales.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(ObsError::config(format!(
                "KinematicsGoal: scales must be finite and non-zero, got {bad}"
            )));
        }
        Ok(())
    }
}

fn default_grayscale_weights() -> [f32; 3] {
    [0.2989, 0.5870, 0.1140]
}

/// Options of the rendered-frame stack encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrayscaleConfig {
    /// `(height, width)` of each rendered frame.
    pub observation_shape: [usize; 2],
    /// Number of stacked frames.
    pub stack_size: usize,
    /// RGB weights of the grayscale conversion.
    #[serde(default = "default_grayscale_weights")]
    pub weights: [f32; 3],
}

impl GrayscaleConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        let [h, w] = self.observation_shape;
        if h == 0 || w == 0 {
            return Err(ObsError::config(format!(
                "GrayscaleObservation: observation_shape must be non-empty, got {h}x{w}"
            )));
        }
        if self.stack_size == 0 {
            return Err(ObsError::config("GrayscaleObservation: stack_size must be > 0"));
        }
        if self.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ObsError::config(format!(
                "GrayscaleObservation: weights must be finite and >= 0, got {:?}",
                self.weights
            )));
        }
        Ok(())
    }
}

/// Options of the attribute pass-through encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributesConfig {
    /// Scene attribute names, in output order.
    pub attributes: Vec<String>,
}

impl AttributesConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ObsError> {
        if self.attributes.is_empty() {
            return Err(ObsError::config("AttributesObservation: attributes must not be empty"));
        }
        for (i, name) in self.attributes.iter().enumerate() {
            if self.attributes[..i].contains(name) {
                return Err(ObsError::config(format!(
                    "AttributesObservation: attribute '{name}' listed twice"
                )));
            }
        }
        Ok(())
    }
}

/// Registered encoder kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObsKind {
    /// Kinematic table of nearby vehicles.
    Kinematics,
    /// Ego-centred occupancy grid.
    OccupancyGrid,
    /// Cropped time-to-collision grid.
    TimeToCollision,
    /// Nearest vehicle ahead/behind per lane.
    SimplifiedKinematics,
    /// Goal-conditioned kinematics.
    KinematicsGoal,
    /// Stack of grayscale rendered frames.
    Grayscale,
    /// Pass-through of named scene attributes.
    Attributes,
}

impl ObsKind {
    /// Configuration tag → kind.
    pub const REGISTRY: [(&'static str, ObsKind); 7] = [
        ("Kinematics", ObsKind::Kinematics),
        ("OccupancyGrid", ObsKind::OccupancyGrid),
        ("TimeToCollision", ObsKind::TimeToCollision),
        ("SimplifiedKinematics", ObsKind::SimplifiedKinematics),
        ("KinematicsGoal", ObsKind::KinematicsGoal),
        ("GrayscaleObservation", ObsKind::Grayscale),
        ("AttributesObservation", ObsKind::Attributes),
    ];

    /// Look up a configuration tag.
    ///
    /// # Errors
    ///
    /// [`ObsError::UnknownObservationType`] for unregistered tags.
    pub fn from_tag(tag: &str) -> Result<Self, ObsError> {
        Self::REGISTRY
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| ObsError::UnknownObservationType {
                tag: tag.to_owned(),
            })
    }

    /// The configuration tag of this kind.
    pub fn tag(self) -> &'static str {
        Self::REGISTRY
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(t, _)| *t)
            .unwrap_or("unknown")
    }
}

impl fmt::Display for ObsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Configuration of one encoder, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObsConfig {
    /// See [`KinematicsConfig`].
    Kinematics(KinematicsConfig),
    /// See [`OccupancyGridConfig`].
    OccupancyGrid(OccupancyGridConfig),
    /// See [`TimeToCollisionConfig`].
    TimeToCollision(TimeToCollisionConfig),
    /// See [`SimplifiedKinematicsConfig`].
    SimplifiedKinematics(SimplifiedKinematicsConfig),
    /// See [`KinematicsGoalConfig`].
    KinematicsGoal(KinematicsGoalConfig),
    /// See [`GrayscaleConfig`].
    #[serde(rename = "GrayscaleObservation")]
    Grayscale(GrayscaleConfig),
    /// See [`AttributesConfig`].
    #[serde(rename = "AttributesObservation")]
    Attributes(AttributesConfig),
}

impl ObsConfig {
    /// The kind of encoder this config builds.
    pub fn kind(&self) -> ObsKind {
        match self {
            Self::Kinematics(_) => ObsKind::Kinematics,
            Self::OccupancyGrid(_) => ObsKind::OccupancyGrid,
            Self::TimeToCollision(_) => ObsKind::TimeToCollision,
            Self::SimplifiedKinematics(_) => ObsKind::SimplifiedKinematics,
            Self::KinematicsGoal(_) => ObsKind::KinematicsGoal,
            Self::Grayscale(_) => ObsKind::Grayscale,
            Self::Attributes(_) => ObsKind::Attributes,
        }
    }

    /// Parse a JSON configuration object.
    ///
    /// # Errors
    ///
    /// - [`ObsError::UnknownObservationType`] if `"type"` is not registered.
    /// - [`ObsError::UnknownFeature`] if a feature name is not extractable.
    /// - [`ObsError::InvalidConfig`] for malformed or missing options.
    ///
    /// Unrecognised option keys are not an error: they are skipped and
    /// reported once with a `warn!` event.
    pub fn from_json(json: &str) -> Result<Self, ObsError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ObsError::config(format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse an already-decoded JSON configuration object.
    pub fn from_value(value: Value) -> Result<Self, ObsError> {
        let tag = value
            .get("type")
            .ok_or_else(|| ObsError::config("missing required option 'type'"))?
            .as_str()
            .ok_or_else(|| ObsError::config("option 'type' must be a string"))?;
        let kind = ObsKind::from_tag(tag)?;
        check_feature_names(&value)?;
        let given: Vec<String> = value
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let config: Self = serde_json::from_value(value)
            .map_err(|e| ObsError::config(format!("{kind}: {e}")))?;
        let ignored = config.ignored_options(&given);
        if !ignored.is_empty() {
            warn!(%kind, ?ignored, "ignoring unknown configuration options");
        }
        Ok(config)
    }

    /// Keys of `given` that no option of this variant consumes.
    fn ignored_options(&self, given: &[String]) -> Vec<String> {
        let Ok(Value::Object(known)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        given
            .iter()
            .filter(|k| !known.contains_key(k.as_str()))
            .cloned()
            .collect()
    }
}

/// Reject unknown names in `features` and `features_range` with a
/// dedicated error before serde reports a generic variant mismatch.
fn check_feature_names(value: &Value) -> Result<(), ObsError> {
    if let Some(features) = value.get("features").and_then(Value::as_array) {
        for name in features.iter().filter_map(Value::as_str) {
            name.parse::<Feature>()?;
        }
    }
    if let Some(range) = value.get("features_range").and_then(Value::as_object) {
        for name in range.keys() {
            name.parse::<Feature>()?;
        }
    }
    Ok(())
}
