//! The fixed-schema per-vehicle feature record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ObsError;
use crate::id::{LaneIndex, NodeId, VehicleId};

/// A scalar column that can be extracted from a [`VehicleRecord`].
///
/// Parsed from snake_case names (`"presence"`, `"vx"`, `"cos_h"`, ...).
/// Anything else is rejected with [`ObsError::UnknownFeature`].
///
/// # Examples
///
/// ```
/// use lanesight_core::Feature;
///
/// let f: Feature = "vx".parse().unwrap();
/// assert_eq!(f, Feature::Vx);
/// assert!("heading".parse::<Feature>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// 1.0 for a real vehicle, 0.0 for a padding row.
    Presence,
    /// Longitudinal position (m).
    X,
    /// Lateral position (m).
    Y,
    /// Longitudinal velocity (m/s).
    Vx,
    /// Lateral velocity (m/s).
    Vy,
    /// Cosine of the heading angle.
    CosH,
    /// Sine of the heading angle.
    SinH,
    /// Cosine of the direction to the destination (intention).
    CosD,
    /// Sine of the direction to the destination (intention).
    SinD,
    /// Lane number within the current road segment.
    LaneIndex,
}

impl Feature {
    /// Every extractable feature, in declaration order.
    pub const ALL: [Feature; 10] = [
        Feature::Presence,
        Feature::X,
        Feature::Y,
        Feature::Vx,
        Feature::Vy,
        Feature::CosH,
        Feature::SinH,
        Feature::CosD,
        Feature::SinD,
        Feature::LaneIndex,
    ];

    /// The snake_case name used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Presence => "presence",
            Feature::X => "x",
            Feature::Y => "y",
            Feature::Vx => "vx",
            Feature::Vy => "vy",
            Feature::CosH => "cos_h",
            Feature::SinH => "sin_h",
            Feature::CosD => "cos_d",
            Feature::SinD => "sin_d",
            Feature::LaneIndex => "lane_index",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ObsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ObsError::UnknownFeature { name: s.to_owned() })
    }
}

/// Named features of one vehicle, either in world coordinates or
/// relative to a reference vehicle.
///
/// Relative records subtract the origin's `x`, `y`, `vx` and `vy`;
/// heading, intention and presence are left untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Identity of the described vehicle.
    pub id: VehicleId,
    /// 1.0 for a real vehicle, 0.0 for an absent one.
    pub presence: f64,
    /// Longitudinal position (m).
    pub x: f64,
    /// Lateral position (m).
    pub y: f64,
    /// Longitudinal velocity (m/s).
    pub vx: f64,
    /// Lateral velocity (m/s).
    pub vy: f64,
    /// Cosine of the heading angle.
    pub cos_h: f64,
    /// Sine of the heading angle.
    pub sin_h: f64,
    /// Lane the vehicle currently occupies.
    pub lane_index: LaneIndex,
    /// Discretized target-speed bucket.
    pub speed_index: usize,
    /// `(cos_d, sin_d)` direction to the destination, when observed.
    pub intention: Option<(f64, f64)>,
}

impl VehicleRecord {
    /// A padding record: `presence == 0` and every numeric field zero.
    pub fn absent() -> Self {
        Self {
            id: VehicleId(0),
            presence: 0.0,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            cos_h: 0.0,
            sin_h: 0.0,
            lane_index: LaneIndex::new(NodeId(0), NodeId(0), 0),
            speed_index: 0,
            intention: None,
        }
    }

    /// Express this record in the moving frame of `origin`.
    pub fn relative_to(&self, origin: &VehicleRecord) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            vx: self.vx - origin.vx,
            vy: self.vy - origin.vy,
            ..self.clone()
        }
    }

    /// Value of a single feature column.
    ///
    /// Intention features read 0.0 when no intention was observed.
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Presence => self.presence,
            Feature::X => self.x,
            Feature::Y => self.y,
            Feature::Vx => self.vx,
            Feature::Vy => self.vy,
            Feature::CosH => self.cos_h,
            Feature::SinH => self.sin_h,
            Feature::CosD => self.intention.map_or(0.0, |(c, _)| c),
            Feature::SinD => self.intention.map_or(0.0, |(_, s)| s),
            Feature::LaneIndex => self.lane_index.lane as f64,
        }
    }

    /// Project the record onto an ordered feature list.
    pub fn row(&self, features: &[Feature]) -> Vec<f64> {
        features.iter().map(|&f| self.feature(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(x: f64, vx: f64) -> VehicleRecord {
        VehicleRecord {
            id: VehicleId(7),
            presence: 1.0,
            x,
            y: 4.0,
            vx,
            vy: 0.5,
            cos_h: 1.0,
            sin_h: 0.0,
            lane_index: LaneIndex::new(NodeId(0), NodeId(1), 1),
            speed_index: 2,
            intention: Some((0.6, 0.8)),
        }
    }

    #[test]
    fn absent_record_is_all_zero() {
        let r = VehicleRecord::absent();
        for f in Feature::ALL {
            assert_eq!(r.feature(f), 0.0, "{f} should be zero");
        }
    }

    #[test]
    fn relative_subtracts_kinematics_only() {
        let ego = record(100.0, 25.0);
        let other = record(150.0, 20.0);
        let rel = other.relative_to(&ego);
        assert_eq!(rel.x, 50.0);
        assert_eq!(rel.vx, -5.0);
        assert_eq!(rel.y, 0.0);
        assert_eq!(rel.presence, 1.0);
        assert_eq!(rel.cos_h, 1.0);
        assert_eq!(rel.intention, Some((0.6, 0.8)));
    }

    #[test]
    fn missing_intention_reads_zero() {
        let mut r = record(0.0, 0.0);
        r.intention = None;
        assert_eq!(r.feature(Feature::CosD), 0.0);
        assert_eq!(r.feature(Feature::SinD), 0.0);
    }

    #[test]
    fn row_follows_feature_order() {
        let r = record(10.0, 3.0);
        let row = r.row(&[Feature::Vx, Feature::Presence, Feature::LaneIndex]);
        assert_eq!(row, vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn feature_names_round_trip() {
        for f in Feature::ALL {
            assert_eq!(f.name().parse::<Feature>().unwrap(), f);
        }
    }
}
