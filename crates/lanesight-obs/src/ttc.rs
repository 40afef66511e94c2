//! Time-to-collision window around the ego vehicle's lane and speed.

use rand::RngCore;
use tracing::{debug, trace};

use lanesight_core::{ObsError, Scene, Tensor, TtcGrid};

use crate::config::{ObsKind, TimeToCollisionConfig};
use crate::observer::ObservationType;
use crate::space::{ObsSpace, Observation};

/// Lanes in the output window: left neighbour, ego lane, right neighbour.
pub const OBS_LANES: usize = 3;

/// Speed buckets in the output window: slower, current, faster.
pub const OBS_SPEEDS: usize = 3;

/// Encoder cropping the scene's TTC grid to a `(3, 3, T)` window.
///
/// Lanes beyond the road edge read as certain collision (1.0). Speed
/// buckets beyond the grid repeat the nearest edge bucket.
#[derive(Clone, Debug)]
pub struct TimeToCollisionObservation {
    config: TimeToCollisionConfig,
    time_quantization: f64,
    times: usize,
    space: ObsSpace,
}

impl TimeToCollisionObservation {
    /// Build the encoder for the scene's policy frequency.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] if the horizon is not positive, the
    /// policy frequency is not positive, or the horizon is shorter than
    /// one policy period.
    pub fn new(config: TimeToCollisionConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let frequency = scene.policy_frequency();
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ObsError::config(format!(
                "TimeToCollision: policy frequency must be > 0, got {frequency}"
            )));
        }
        let time_quantization = 1.0 / frequency;
        let times = TtcGrid::time_buckets(config.horizon, time_quantization);
        if times == 0 {
            return Err(ObsError::config(format!(
                "TimeToCollision: horizon {}s is shorter than one policy period",
                config.horizon
            )));
        }
        let shape = [OBS_SPEEDS, OBS_LANES, times];
        debug!(kind = %ObsKind::TimeToCollision, ?shape, "encoder constructed");
        Ok(Self {
            config,
            time_quantization,
            times,
            space: ObsSpace::bounded(&shape, 0.0, 1.0),
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &TimeToCollisionConfig {
        &self.config
    }

    /// Number of time buckets `T`.
    pub fn times(&self) -> usize {
        self.times
    }

    /// Crop `grid` around `(speed, lane)` without ever indexing out of
    /// bounds.
    fn window(&self, grid: &TtcGrid, speed: usize, lane: usize) -> Tensor {
        let (speeds, lanes, times) = grid.dims();
        let mut out = Tensor::zeros(&[OBS_SPEEDS, OBS_LANES, times]);
        for s in 0..OBS_SPEEDS {
            let src_speed = (speed + s).saturating_sub(1).min(speeds - 1);
            for l in 0..OBS_LANES {
                let src_lane = (lane + l).checked_sub(1).filter(|&i| i < lanes);
                for t in 0..times {
                    let value = src_lane.map_or(1.0, |i| grid.get(src_speed, i, t));
                    out.set(&[s, l, t], value);
                }
            }
        }
        out
    }
}

impl ObservationType for TimeToCollisionObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::TimeToCollision
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        _rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let grid = scene.ttc_grid(self.time_quantization, self.config.horizon)?;
        let (speeds, lanes, times) = grid.dims();
        if speeds == 0 {
            return Err(ObsError::execution(
                "TimeToCollision: grid has no speed buckets",
            ));
        }
        if times != self.times {
            return Err(ObsError::execution(format!(
                "TimeToCollision: grid has {times} time buckets, expected {}",
                self.times
            )));
        }
        let ego = scene.ego();
        let lane = ego.lane_index().lane;
        let speed = ego.speed_index();
        trace!(speeds, lanes, lane, speed, "ttc window");
        Ok(self.window(&grid, speed, lane).into())
    }
}
