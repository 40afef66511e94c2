//! Ego-centred occupancy grid.
//!
//! Every vehicle on the road (ego included) is binned into a
//! `(features, rows, cols)` grid by its ego-relative position. Rows are
//! lateral cells, columns longitudinal cells. When two vehicles fall
//! into the same cell the one visited last wins.

use rand::RngCore;
use tracing::{debug, trace};

use lanesight_core::{ObsError, Scene, Tensor};

use crate::config::{ObsKind, OccupancyGridConfig};
use crate::observer::ObservationType;
use crate::range::FeatureRange;
use crate::space::{ObsSpace, Observation};

/// Encoder binning nearby traffic into a fixed grid around the ego
/// vehicle.
#[derive(Clone, Debug)]
pub struct OccupancyGridObservation {
    config: OccupancyGridConfig,
    range: FeatureRange,
    space: ObsSpace,
    grid: Tensor,
}

impl OccupancyGridObservation {
    /// Build the encoder.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] for an empty grid, non-positive steps
    /// or bad ranges. `absolute = true` is accepted here and rejected on
    /// the first [`observe`](ObservationType::observe).
    pub fn new(config: OccupancyGridConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let range = FeatureRange::resolve(config.features_range.as_ref(), || {
            FeatureRange::occupancy(scene.speed_max())
        })?;
        let (rows, cols) = config.grid_shape();
        let shape = [config.features.len(), rows, cols];
        debug!(kind = %ObsKind::OccupancyGrid, ?shape, "encoder constructed");
        Ok(Self {
            config,
            range,
            space: ObsSpace::bounded(&shape, -1.0, 1.0),
            grid: Tensor::zeros(&shape),
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &OccupancyGridConfig {
        &self.config
    }

    /// `(row, col)` of an ego-relative position, or `None` outside the
    /// grid.
    fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let [[x_lo, _], [y_lo, _]] = self.config.grid_size;
        let [x_step, y_step] = self.config.grid_step;
        let (rows, cols) = self.config.grid_shape();
        let col = ((x - x_lo) / x_step).floor();
        let row = ((y - y_lo) / y_step).floor();
        let inside = col >= 0.0 && row >= 0.0 && col < cols as f64 && row < rows as f64;
        inside.then_some((row as usize, col as usize))
    }
}

impl ObservationType for OccupancyGridObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::OccupancyGrid
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        _rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        if self.config.absolute {
            return Err(ObsError::UnsupportedMode {
                reason: "OccupancyGrid: absolute coordinates are not supported".into(),
            });
        }

        self.grid.fill(0.0);
        let ego = scene.ego();
        let mut binned = 0usize;
        for vehicle in scene.road().vehicles() {
            let record = vehicle.to_record(Some(ego), false);
            let Some((row, col)) = self.cell(record.x, record.y) else {
                continue;
            };
            binned += 1;
            for (layer, &feature) in self.config.features.iter().enumerate() {
                let value = self.range.normalize(feature, record.feature(feature), false);
                self.grid.set(&[layer, row, col], value as f32);
            }
        }
        trace!(binned, "occupancy grid filled");

        self.grid.clip(-1.0, 1.0);
        Ok(self.grid.clone().into())
    }
}
