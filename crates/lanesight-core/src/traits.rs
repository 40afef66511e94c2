//! Read-only collaborator traits through which encoders observe the
//! simulation.
//!
//! These decouple the encoders from any concrete vehicle, road, or
//! environment implementation: encoders read through `&dyn Scene` and
//! never mutate simulation state.

use crate::error::SceneError;
use crate::grid::{RgbFrame, TtcGrid};
use crate::id::{LaneIndex, VehicleId};
use crate::record::VehicleRecord;
use crate::tensor::Tensor;

/// Default lane width in metres.
pub const DEFAULT_LANE_WIDTH: f64 = 4.0;

/// Default maximum vehicle speed in m/s.
pub const DEFAULT_SPEED_MAX: f64 = 30.0;

/// A vehicle as seen by the observation encoders.
pub trait Vehicle {
    /// Stable identifier.
    fn id(&self) -> VehicleId;

    /// Current state in world coordinates, with `presence == 1` and
    /// the intention populated if the vehicle has a destination.
    fn state(&self) -> VehicleRecord;

    /// Feature record, optionally expressed in `origin`'s moving frame.
    ///
    /// The intention is stripped unless `observe_intentions` is set.
    fn to_record(&self, origin: Option<&dyn Vehicle>, observe_intentions: bool) -> VehicleRecord {
        let mut record = self.state();
        if let Some(origin) = origin {
            record = record.relative_to(&origin.state());
        }
        if !observe_intentions {
            record.intention = None;
        }
        record
    }

    /// Lane the vehicle currently occupies.
    fn lane_index(&self) -> LaneIndex;

    /// Discretized target-speed bucket.
    fn speed_index(&self) -> usize;

    /// Whether the vehicle has collided.
    fn crashed(&self) -> bool {
        false
    }
}

/// Road topology and traffic queries.
pub trait Road {
    /// All lanes of the segment containing `lane`, leftmost first.
    fn side_lanes(&self, lane: &LaneIndex) -> Vec<LaneIndex>;

    /// Lane width in metres.
    fn lane_width(&self) -> f64 {
        DEFAULT_LANE_WIDTH
    }

    /// Every vehicle on the road, the ego vehicle included.
    fn vehicles(&self) -> Vec<&dyn Vehicle>;

    /// Vehicles within `distance` of `reference`, nearest first.
    ///
    /// `reference` itself is excluded. At most `count` vehicles are
    /// returned when `count` is `Some`. Vehicles behind the reference are
    /// only included when `see_behind` is set.
    fn close_vehicles_to(
        &self,
        reference: &dyn Vehicle,
        distance: f64,
        count: Option<usize>,
        see_behind: bool,
    ) -> Vec<&dyn Vehicle>;
}

/// The environment surface consumed by encoders.
pub trait Scene {
    /// The current road.
    fn road(&self) -> &dyn Road;

    /// The controlled (ego) vehicle.
    fn ego(&self) -> &dyn Vehicle;

    /// Radius (m) of the ego vehicle's perception.
    fn perception_distance(&self) -> f64;

    /// Agent decisions per simulated second.
    fn policy_frequency(&self) -> f64;

    /// Maximum vehicle speed (m/s), used to build normalization ranges.
    fn speed_max(&self) -> f64 {
        DEFAULT_SPEED_MAX
    }

    /// Goal entity for goal-conditioned tasks.
    fn goal(&self) -> Option<&dyn Vehicle> {
        None
    }

    /// Named auxiliary value exposed by the environment.
    fn attribute(&self, _name: &str) -> Option<Tensor> {
        None
    }

    /// Render the current scene.
    fn render_rgb(&self) -> Result<RgbFrame, SceneError> {
        Err(SceneError::RenderUnavailable)
    }

    /// Time-to-collision grid for the ego vehicle, quantized every
    /// `time_quantization` seconds up to `horizon` seconds.
    fn ttc_grid(&self, _time_quantization: f64, _horizon: f64) -> Result<TtcGrid, SceneError> {
        Err(SceneError::TtcUnavailable)
    }
}
