//! Observation encoders for lanesight traffic scenes.
//!
//! Each encoder turns the read-only view of a simulation
//! ([`Scene`](lanesight_core::Scene)) into a fixed-shape observation for
//! a learning agent. Encoders are selected by an [`ObsConfig`] tag,
//! resolve their normalization ranges once when built, and then produce
//! one [`Observation`] per tick that always lies in their declared
//! [`ObsSpace`].
//!
//! | Tag | Encoder | Output |
//! |-----|---------|--------|
//! | `Kinematics` | [`KinematicsObservation`] | `(vehicles, features)` |
//! | `OccupancyGrid` | [`OccupancyGridObservation`] | `(features, rows, cols)` |
//! | `TimeToCollision` | [`TimeToCollisionObservation`] | `(3, 3, T)` |
//! | `SimplifiedKinematics` | [`SimplifiedKinematicsObservation`] | `(6 + 8L,)` |
//! | `KinematicsGoal` | [`KinematicsGoalObservation`] | `Dict` of `(features,)` |
//! | `GrayscaleObservation` | [`GrayscaleObservation`] | `(H, W, stack)` |
//! | `AttributesObservation` | [`AttributesObservation`] | `Dict` of attributes |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod attributes;
pub mod config;
pub mod goal;
pub mod grayscale;
pub mod kinematics;
pub mod normalize;
pub mod observer;
pub mod occupancy;
pub mod range;
pub mod simplified;
pub mod space;
pub mod ttc;

pub use attributes::AttributesObservation;
pub use config::{
    AttributesConfig, FeatureBounds, GrayscaleConfig, KinematicsConfig, KinematicsGoalConfig,
    ObsConfig, ObsKind, OccupancyGridConfig, SimplifiedKinematicsConfig, TimeToCollisionConfig,
    VehicleOrder,
};
pub use goal::KinematicsGoalObservation;
pub use grayscale::GrayscaleObservation;
pub use kinematics::KinematicsObservation;
pub use observer::{ObservationType, Observer};
pub use occupancy::OccupancyGridObservation;
pub use range::{FeatureRange, RoadFacts};
pub use simplified::SimplifiedKinematicsObservation;
pub use space::{ObsDtype, ObsSpace, Observation};
pub use ttc::{TimeToCollisionObservation, OBS_LANES, OBS_SPEEDS};
