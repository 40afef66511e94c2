//! The encoder interface and the config-driven factory.
//!
//! Every encoder implements [`ObservationType`]. [`Observer`] is the
//! closed set of encoders an environment can be configured with; it is
//! built from an [`ObsConfig`] and dispatches to the selected variant.
//!
//! ```
//! use lanesight_obs::{ObservationType, Observer};
//! use lanesight_test_utils::fixtures;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let scene = fixtures::ahead_and_behind();
//! let mut observer =
//!     Observer::from_json(r#"{"type": "Kinematics", "vehicles_count": 3}"#, &scene).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let obs = observer.observe(&scene, &mut rng).unwrap();
//! assert!(observer.space().contains(&obs));
//! ```

use rand::RngCore;

use lanesight_core::{ObsError, Scene};

use crate::attributes::AttributesObservation;
use crate::config::{ObsConfig, ObsKind};
use crate::goal::KinematicsGoalObservation;
use crate::grayscale::GrayscaleObservation;
use crate::kinematics::KinematicsObservation;
use crate::occupancy::OccupancyGridObservation;
use crate::simplified::SimplifiedKinematicsObservation;
use crate::space::{ObsSpace, Observation};
use crate::ttc::TimeToCollisionObservation;

/// An observation encoder.
///
/// Encoders are built once per episode against the scene, declare a
/// space that never changes afterwards, and produce one observation per
/// tick. They only read the scene; randomness comes from the caller's
/// seeded generator.
pub trait ObservationType {
    /// Which registered kind this encoder is.
    fn kind(&self) -> ObsKind;

    /// Shape and bounds of every observation this encoder produces.
    fn space(&self) -> &ObsSpace;

    /// Encode the current scene.
    ///
    /// On error nothing is returned; no partially filled tensor escapes.
    fn observe(
        &mut self,
        scene: &dyn Scene,
        rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError>;

    /// Clear state carried between calls. Stateless encoders ignore it.
    fn reset(&mut self) {}
}

/// One of the registered encoders.
#[derive(Clone, Debug)]
pub enum Observer {
    /// See [`KinematicsObservation`].
    Kinematics(KinematicsObservation),
    /// See [`OccupancyGridObservation`].
    OccupancyGrid(OccupancyGridObservation),
    /// See [`TimeToCollisionObservation`].
    TimeToCollision(TimeToCollisionObservation),
    /// See [`SimplifiedKinematicsObservation`].
    SimplifiedKinematics(SimplifiedKinematicsObservation),
    /// See [`KinematicsGoalObservation`].
    KinematicsGoal(KinematicsGoalObservation),
    /// See [`GrayscaleObservation`].
    Grayscale(GrayscaleObservation),
    /// See [`AttributesObservation`].
    Attributes(AttributesObservation),
}

impl Observer {
    /// Build the encoder `config` selects, resolving its ranges and
    /// shapes against `scene`.
    ///
    /// # Errors
    ///
    /// Configuration errors ([`ObsError::is_configuration`]) for invalid
    /// options or attributes missing from the scene.
    pub fn new(config: &ObsConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        Ok(match config {
            ObsConfig::Kinematics(c) => {
                Self::Kinematics(KinematicsObservation::new(c.clone(), scene)?)
            }
            ObsConfig::OccupancyGrid(c) => {
                Self::OccupancyGrid(OccupancyGridObservation::new(c.clone(), scene)?)
            }
            ObsConfig::TimeToCollision(c) => {
                Self::TimeToCollision(TimeToCollisionObservation::new(c.clone(), scene)?)
            }
            ObsConfig::SimplifiedKinematics(c) => {
                Self::SimplifiedKinematics(SimplifiedKinematicsObservation::new(c.clone(), scene)?)
            }
            ObsConfig::KinematicsGoal(c) => {
                Self::KinematicsGoal(KinematicsGoalObservation::new(c.clone(), scene)?)
            }
            ObsConfig::Grayscale(c) => {
                Self::Grayscale(GrayscaleObservation::new(c.clone(), scene)?)
            }
            ObsConfig::Attributes(c) => {
                Self::Attributes(AttributesObservation::new(c.clone(), scene)?)
            }
        })
    }

    /// Parse `json` with [`ObsConfig::from_json`] and build the encoder.
    pub fn from_json(json: &str, scene: &dyn Scene) -> Result<Self, ObsError> {
        Self::new(&ObsConfig::from_json(json)?, scene)
    }

    fn inner(&self) -> &dyn ObservationType {
        match self {
            Self::Kinematics(o) => o,
            Self::OccupancyGrid(o) => o,
            Self::TimeToCollision(o) => o,
            Self::SimplifiedKinematics(o) => o,
            Self::KinematicsGoal(o) => o,
            Self::Grayscale(o) => o,
            Self::Attributes(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ObservationType {
        match self {
            Self::Kinematics(o) => o,
            Self::OccupancyGrid(o) => o,
            Self::TimeToCollision(o) => o,
            Self::SimplifiedKinematics(o) => o,
            Self::KinematicsGoal(o) => o,
            Self::Grayscale(o) => o,
            Self::Attributes(o) => o,
        }
    }
}

impl ObservationType for Observer {
    fn kind(&self) -> ObsKind {
        self.inner().kind()
    }

    fn space(&self) -> &ObsSpace {
        self.inner().space()
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        self.inner_mut().observe(scene, rng)
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanesight_core::{RgbFrame, Tensor};
    use lanesight_test_utils::fixtures;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    #[test]
    fn every_kind_builds_from_json() {
        let mut scene = fixtures::ahead_and_behind();
        scene.set_attribute("speed", Tensor::vector(vec![25.0]));
        scene.set_frame(RgbFrame::solid(4, 4, [0.5, 0.5, 0.5]));
        let goal = scene.road.vehicle(9, 0, 300.0, 0.0);
        let scene = scene.with_goal(goal);

        let configs = [
            json!({"type": "Kinematics"}),
            json!({"type": "OccupancyGrid"}),
            json!({"type": "TimeToCollision"}),
            json!({"type": "SimplifiedKinematics"}),
            json!({"type": "KinematicsGoal", "scales": [1, 100, 100, 5, 5]}),
            json!({"type": "GrayscaleObservation", "observation_shape": [4, 4], "stack_size": 2}),
            json!({"type": "AttributesObservation", "attributes": ["speed"]}),
        ];
        for (value, (tag, kind)) in configs.into_iter().zip(ObsKind::REGISTRY) {
            let config = ObsConfig::from_value(value).unwrap();
            let observer = Observer::new(&config, &scene).unwrap();
            assert_eq!(observer.kind(), kind, "{tag}");
        }
    }

    #[test]
    fn unknown_tag_fails_before_construction() {
        let scene = fixtures::highway(3, 1);
        let err = Observer::from_json(r#"{"type": "Radar"}"#, &scene).unwrap_err();
        assert!(matches!(err, ObsError::UnknownObservationType { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn reset_reaches_stateful_variant() {
        let mut scene = fixtures::highway(3, 1);
        scene.set_frame(RgbFrame::solid(1, 1, [1.0, 1.0, 1.0]));
        let mut observer = Observer::from_json(
            r#"{"type": "GrayscaleObservation", "observation_shape": [1, 1], "stack_size": 2,
                "weights": [1.0, 0.0, 0.0]}"#,
            &scene,
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        observer.observe(&scene, &mut rng).unwrap();
        observer.reset();
        let t = observer.observe(&scene, &mut rng).unwrap().into_tensor().unwrap();
        assert_eq!(t.as_slice(), &[0.0, 1.0]);
    }
}
