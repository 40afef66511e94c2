//! Kinematic table of the ego vehicle and its nearest neighbours.
//!
//! Output is a `(vehicles_count, features)` tensor. Row 0 is always the
//! ego vehicle in world coordinates; the following rows hold the closest
//! vehicles within perception distance, expressed in ego's frame unless
//! `absolute` is set, and zero rows pad the table when fewer vehicles
//! are visible.

use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::{debug, trace};

use lanesight_core::{ObsError, Scene, Tensor, VehicleRecord};

use crate::config::{KinematicsConfig, ObsKind, VehicleOrder};
use crate::observer::ObservationType;
use crate::range::{FeatureRange, RoadFacts};
use crate::space::{ObsSpace, Observation};

/// Encoder producing a fixed-shape table of vehicle features.
#[derive(Clone, Debug)]
pub struct KinematicsObservation {
    config: KinematicsConfig,
    range: FeatureRange,
    space: ObsSpace,
}

impl KinematicsObservation {
    /// Build the encoder and resolve its normalization range against the
    /// scene's current road.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] for empty features or bad ranges.
    pub fn new(config: KinematicsConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let facts = RoadFacts::from_scene(scene);
        let range = FeatureRange::resolve(config.features_range.as_ref(), || {
            FeatureRange::kinematics(facts, scene.speed_max())
        })?;
        let shape = [config.vehicles_count, config.features.len()];
        let space = if config.normalize && config.clip {
            ObsSpace::bounded(&shape, -1.0, 1.0)
        } else {
            ObsSpace::unbounded(&shape)
        };
        debug!(
            kind = %ObsKind::Kinematics,
            ?shape,
            order = ?config.order,
            "encoder constructed"
        );
        Ok(Self {
            config,
            range,
            space,
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    /// The resolved normalization range.
    pub fn range(&self) -> &FeatureRange {
        &self.range
    }

    /// Ego record followed by up to `vehicles_count - 1` neighbours,
    /// nearest first.
    fn records(&self, scene: &dyn Scene) -> Vec<VehicleRecord> {
        let config = &self.config;
        let ego = scene.ego();
        let mut records = vec![ego.to_record(None, config.observe_intentions)];
        let origin = if config.absolute { None } else { Some(ego) };
        let neighbours = scene.road().close_vehicles_to(
            ego,
            scene.perception_distance(),
            Some(config.vehicles_count - 1),
            config.see_behind,
        );
        trace!(neighbours = neighbours.len(), "kinematics scan");
        records.extend(
            neighbours
                .into_iter()
                .map(|v| v.to_record(origin, config.observe_intentions)),
        );
        records
    }

    fn encode_row(&self, record: &VehicleRecord) -> Vec<f32> {
        let features = &self.config.features;
        record
            .row(features)
            .into_iter()
            .zip(features)
            .map(|(v, &f)| {
                let v = if self.config.normalize {
                    self.range.normalize(f, v, self.config.clip)
                } else {
                    v
                };
                v as f32
            })
            .collect()
    }
}

impl ObservationType for KinematicsObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::Kinematics
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let rows = self.config.vehicles_count;
        let cols = self.config.features.len();
        if rows == 0 {
            return Ok(Tensor::zeros(&[0, cols]).into());
        }

        let mut table: Vec<Vec<f32>> = self
            .records(scene)
            .iter()
            .map(|r| self.encode_row(r))
            .collect();
        table.resize(rows, vec![0.0; cols]);

        if self.config.order == VehicleOrder::Shuffled {
            table[1..].shuffle(rng);
        }

        let data = table.into_iter().flatten().collect();
        Ok(Tensor::from_vec(&[rows, cols], data)?.into())
    }
}
