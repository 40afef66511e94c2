//! Goal-conditioned kinematics: ego state alongside a goal state, both
//! scaled by fixed per-feature divisors.

use indexmap::IndexMap;
use rand::RngCore;
use tracing::debug;

use lanesight_core::{ObsError, Scene, Tensor, VehicleRecord};

use crate::config::{KinematicsGoalConfig, ObsKind};
use crate::observer::ObservationType;
use crate::space::{ObsSpace, Observation};

/// Key of the ego vector used as the policy input.
pub const OBSERVATION: &str = "observation";
/// Key of the ego vector reported as the goal reached so far.
pub const ACHIEVED_GOAL: &str = "achieved_goal";
/// Key of the goal entity's vector.
pub const DESIRED_GOAL: &str = "desired_goal";

/// Encoder producing `{observation, achieved_goal, desired_goal}`.
#[derive(Clone, Debug)]
pub struct KinematicsGoalObservation {
    config: KinematicsGoalConfig,
    space: ObsSpace,
}

impl KinematicsGoalObservation {
    /// Build the encoder.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] if `scales` does not match `features`
    /// or contains a zero.
    pub fn new(config: KinematicsGoalConfig, _scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let shape = [config.features.len()];
        let space = ObsSpace::Dict(
            [OBSERVATION, ACHIEVED_GOAL, DESIRED_GOAL]
                .into_iter()
                .map(|k| (k.to_owned(), ObsSpace::unbounded(&shape)))
                .collect(),
        );
        debug!(kind = %ObsKind::KinematicsGoal, ?shape, "encoder constructed");
        Ok(Self { config, space })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &KinematicsGoalConfig {
        &self.config
    }

    fn scaled(&self, record: &VehicleRecord) -> Tensor {
        let data = self
            .config
            .features
            .iter()
            .zip(&self.config.scales)
            .map(|(&f, &scale)| (record.feature(f) / scale) as f32)
            .collect();
        Tensor::vector(data)
    }
}

impl ObservationType for KinematicsGoalObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::KinematicsGoal
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        _rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let goal = scene
            .goal()
            .ok_or_else(|| ObsError::execution("KinematicsGoal: scene has no goal"))?;
        let ego = self.scaled(&scene.ego().to_record(None, false));
        let desired = self.scaled(&goal.to_record(None, false));

        let mut out = IndexMap::with_capacity(3);
        out.insert(OBSERVATION.to_owned(), ego.clone());
        out.insert(ACHIEVED_GOAL.to_owned(), ego);
        out.insert(DESIRED_GOAL.to_owned(), desired);
        Ok(Observation::Dict(out))
    }
}
