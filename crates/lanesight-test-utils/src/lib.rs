//! Test utilities and mock types for lanesight development.
//!
//! Provides mock implementations of the collaborator traits
//! ([`Vehicle`], [`Road`], [`Scene`]) over a straight multi-lane road,
//! plus scenario [`fixtures`] for encoder tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use lanesight_core::{
    LaneIndex, NodeId, RgbFrame, Road, Scene, SceneError, Tensor, TtcGrid, Vehicle, VehicleId,
    VehicleRecord, DEFAULT_LANE_WIDTH, DEFAULT_SPEED_MAX,
};

/// Vehicle length in metres, used by the neighbour query margin.
pub const VEHICLE_LENGTH: f64 = 5.0;

/// Mock vehicle with directly settable kinematics.
///
/// Heading is measured from the road axis; lateral position is
/// normally derived from the lane by [`StraightRoad::vehicle`].
#[derive(Clone, Debug)]
pub struct MockVehicle {
    pub id: VehicleId,
    pub lane: LaneIndex,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    pub speed_index: usize,
    pub intention: Option<(f64, f64)>,
    pub crashed: bool,
}

impl MockVehicle {
    /// Set the discretized speed bucket.
    pub fn with_speed_index(mut self, speed_index: usize) -> Self {
        self.speed_index = speed_index;
        self
    }

    /// Set the direction to the destination as `(cos_d, sin_d)`.
    pub fn with_intention(mut self, cos_d: f64, sin_d: f64) -> Self {
        self.intention = Some((cos_d, sin_d));
        self
    }

    /// Set the lateral velocity.
    pub fn with_vy(mut self, vy: f64) -> Self {
        self.vy = vy;
        self
    }
}

impl Vehicle for MockVehicle {
    fn id(&self) -> VehicleId {
        self.id
    }

    fn state(&self) -> VehicleRecord {
        VehicleRecord {
            id: self.id,
            presence: 1.0,
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            cos_h: self.heading.cos(),
            sin_h: self.heading.sin(),
            lane_index: self.lane,
            speed_index: self.speed_index,
            intention: self.intention,
        }
    }

    fn lane_index(&self) -> LaneIndex {
        self.lane
    }

    fn speed_index(&self) -> usize {
        self.speed_index
    }

    fn crashed(&self) -> bool {
        self.crashed
    }
}

/// A single straight segment `0 → 1` with `lanes_count` parallel lanes
/// along the x axis. Lane 0 is leftmost at `y = 0`.
#[derive(Clone, Debug)]
pub struct StraightRoad {
    pub lanes_count: usize,
    pub lane_width: f64,
    pub vehicles: Vec<MockVehicle>,
}

impl StraightRoad {
    pub fn new(lanes_count: usize) -> Self {
        Self {
            lanes_count,
            lane_width: DEFAULT_LANE_WIDTH,
            vehicles: Vec::new(),
        }
    }

    /// Lane index of lane number `lane` on the segment.
    pub fn lane(&self, lane: usize) -> LaneIndex {
        LaneIndex::new(NodeId(0), NodeId(1), lane)
    }

    /// A vehicle centred on lane `lane` at longitudinal position `x`,
    /// driving along the road at `speed`.
    pub fn vehicle(&self, id: u64, lane: usize, x: f64, speed: f64) -> MockVehicle {
        MockVehicle {
            id: VehicleId(id),
            lane: self.lane(lane),
            x,
            y: lane as f64 * self.lane_width,
            vx: speed,
            vy: 0.0,
            heading: 0.0,
            speed_index: 0,
            intention: None,
            crashed: false,
        }
    }

    /// Add a vehicle to the road.
    pub fn push(&mut self, vehicle: MockVehicle) -> &mut Self {
        self.vehicles.push(vehicle);
        self
    }

    pub fn get(&self, id: VehicleId) -> Option<&MockVehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut MockVehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }
}

impl Road for StraightRoad {
    fn side_lanes(&self, lane: &LaneIndex) -> Vec<LaneIndex> {
        (0..self.lanes_count).map(|l| lane.with_lane(l)).collect()
    }

    fn lane_width(&self) -> f64 {
        self.lane_width
    }

    fn vehicles(&self) -> Vec<&dyn Vehicle> {
        self.vehicles.iter().map(|v| v as &dyn Vehicle).collect()
    }

    fn close_vehicles_to(
        &self,
        reference: &dyn Vehicle,
        distance: f64,
        count: Option<usize>,
        see_behind: bool,
    ) -> Vec<&dyn Vehicle> {
        let origin = reference.state();
        let mut close: Vec<(&MockVehicle, f64)> = self
            .vehicles
            .iter()
            .filter(|v| v.id != origin.id)
            .filter_map(|v| {
                let dx = v.x - origin.x;
                let dy = v.y - origin.y;
                let in_range = (dx * dx + dy * dy).sqrt() < distance;
                let visible = see_behind || dx > -2.0 * VEHICLE_LENGTH;
                (in_range && visible).then_some((v, dx))
            })
            .collect();
        close.sort_by(|a, b| a.1.abs().total_cmp(&b.1.abs()));
        if let Some(count) = count {
            close.truncate(count);
        }
        close.into_iter().map(|(v, _)| v as &dyn Vehicle).collect()
    }
}

/// Mock environment over a [`StraightRoad`].
///
/// The ego vehicle lives on the road like any other vehicle and is
/// looked up by id. Attributes, rendered frames and the TTC grid are
/// preset by the test; without a preset grid, [`Scene::ttc_grid`]
/// falls back to [`fixtures::straight_road_ttc_grid`].
pub struct MockScene {
    pub road: StraightRoad,
    pub ego_id: VehicleId,
    pub perception_distance: f64,
    pub policy_frequency: f64,
    pub speed_max: f64,
    pub goal: Option<MockVehicle>,
    attributes: HashMap<String, Tensor>,
    frame: Option<RgbFrame>,
    ttc: Option<Result<TtcGrid, SceneError>>,
}

impl MockScene {
    /// Wrap a road whose vehicles include `ego_id`.
    ///
    /// # Panics
    ///
    /// If no vehicle on the road carries `ego_id`.
    pub fn new(road: StraightRoad, ego_id: VehicleId) -> Self {
        assert!(road.get(ego_id).is_some(), "ego {ego_id} is not on the road");
        Self {
            road,
            ego_id,
            perception_distance: 6.0 * DEFAULT_SPEED_MAX,
            policy_frequency: 1.0,
            speed_max: DEFAULT_SPEED_MAX,
            goal: None,
            attributes: HashMap::new(),
            frame: None,
            ttc: None,
        }
    }

    pub fn with_goal(mut self, goal: MockVehicle) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn with_policy_frequency(mut self, hz: f64) -> Self {
        self.policy_frequency = hz;
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: Tensor) {
        self.attributes.insert(name.into(), value);
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn set_frame(&mut self, frame: RgbFrame) {
        self.frame = Some(frame);
    }

    /// Preset the TTC routine's result (grid or failure).
    pub fn set_ttc(&mut self, ttc: Result<TtcGrid, SceneError>) {
        self.ttc = Some(ttc);
    }

    pub fn ego_mut(&mut self) -> &mut MockVehicle {
        let id = self.ego_id;
        self.road
            .get_mut(id)
            .expect("ego vehicle is always on the road")
    }
}

impl Scene for MockScene {
    fn road(&self) -> &dyn Road {
        &self.road
    }

    fn ego(&self) -> &dyn Vehicle {
        self.road
            .get(self.ego_id)
            .expect("ego vehicle is always on the road")
    }

    fn perception_distance(&self) -> f64 {
        self.perception_distance
    }

    fn policy_frequency(&self) -> f64 {
        self.policy_frequency
    }

    fn speed_max(&self) -> f64 {
        self.speed_max
    }

    fn goal(&self) -> Option<&dyn Vehicle> {
        self.goal.as_ref().map(|g| g as &dyn Vehicle)
    }

    fn attribute(&self, name: &str) -> Option<Tensor> {
        self.attributes.get(name).cloned()
    }

    fn render_rgb(&self) -> Result<RgbFrame, SceneError> {
        self.frame.clone().ok_or(SceneError::RenderUnavailable)
    }

    fn ttc_grid(&self, time_quantization: f64, horizon: f64) -> Result<TtcGrid, SceneError> {
        match &self.ttc {
            Some(preset) => preset.clone(),
            None => Ok(fixtures::straight_road_ttc_grid(
                self,
                time_quantization,
                horizon,
            )),
        }
    }
}
