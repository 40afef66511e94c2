//! Lanesight: observation encoders for traffic-simulation reinforcement
//! learning.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the lanesight sub-crates. For most users, adding `lanesight` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lanesight::prelude::*;
//! use lanesight_test_utils::fixtures;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // Ego on lane 1, one vehicle 50 m ahead, one 30 m behind on lane 2.
//! let scene = fixtures::ahead_and_behind();
//!
//! let config = ObsConfig::Kinematics(KinematicsConfig {
//!     vehicles_count: 5,
//!     see_behind: true,
//!     normalize: false,
//!     ..Default::default()
//! });
//! let mut observer = Observer::new(&config, &scene).unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let obs = observer.observe(&scene, &mut rng).unwrap();
//! let table = obs.as_tensor().unwrap();
//! assert_eq!(table.shape(), &[5, 5]);
//! assert_eq!(table.row(1)[1], -30.0);
//! assert_eq!(table.row(2)[1], 50.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lanesight-core` | IDs, vehicle records, tensors, errors, scene traits |
//! | [`obs`] | `lanesight-obs` | Encoder configs, encoders, spaces, normalization |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and collaborator traits (`lanesight-core`).
///
/// Contains identifiers, the [`types::VehicleRecord`] schema, dense
/// [`types::Tensor`] buffers, error types, and the read-only traits
/// ([`types::Vehicle`], [`types::Road`], [`types::Scene`]) an
/// environment implements to be observed.
pub use lanesight_core as types;

/// Observation encoders (`lanesight-obs`).
///
/// Build an [`obs::ObsConfig`], turn it into an [`obs::Observer`], and
/// call [`obs::ObservationType::observe`] once per tick.
pub use lanesight_obs as obs;

/// Common imports for typical lanesight usage.
///
/// ```rust
/// use lanesight::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use lanesight_core::{
        Feature, LaneIndex, Road, Scene, Tensor, Vehicle, VehicleId, VehicleRecord,
    };

    // Errors
    pub use lanesight_core::{ObsError, SceneError};

    // Configuration
    pub use lanesight_obs::{
        AttributesConfig, GrayscaleConfig, KinematicsConfig, KinematicsGoalConfig, ObsConfig,
        ObsKind, OccupancyGridConfig, SimplifiedKinematicsConfig, TimeToCollisionConfig,
        VehicleOrder,
    };

    // Encoders
    pub use lanesight_obs::{ObsSpace, Observation, ObservationType, Observer};
}
