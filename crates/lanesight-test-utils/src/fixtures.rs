//! Reusable scene fixtures.
//!
//! - [`highway`]: empty multi-lane road with a single ego vehicle.
//! - [`ahead_and_behind`]: ego plus one vehicle 50 m ahead in the same
//!   lane and one 30 m behind in the adjacent lane.
//! - [`random_traffic`]: seeded dense traffic for property tests and
//!   benchmarks.
//! - [`straight_road_ttc_grid`]: reference TTC routine for straight roads.

use lanesight_core::{Scene, TtcGrid, VehicleId};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{MockScene, StraightRoad, VEHICLE_LENGTH};

/// Lowest target speed (m/s) of a discretized-speed vehicle.
pub const SPEED_MIN: f64 = 20.0;

/// Highest target speed (m/s) of a discretized-speed vehicle.
pub const SPEED_MAX: f64 = 30.0;

/// Number of discretized target speeds.
pub const SPEED_COUNT: usize = 3;

/// Id of the ego vehicle in every fixture.
pub const EGO: VehicleId = VehicleId(0);

/// Target speed of speed bucket `index`.
pub fn speed_for_index(index: usize) -> f64 {
    SPEED_MIN + index as f64 * (SPEED_MAX - SPEED_MIN) / (SPEED_COUNT - 1) as f64
}

/// A road with `lanes` lanes and only the ego vehicle, at `x = 0` on
/// lane `ego_lane` driving at the middle speed bucket.
pub fn highway(lanes: usize, ego_lane: usize) -> MockScene {
    let mut road = StraightRoad::new(lanes);
    let ego = road
        .vehicle(EGO.0, ego_lane, 0.0, speed_for_index(1))
        .with_speed_index(1);
    road.push(ego);
    MockScene::new(road, EGO)
}

/// Three-lane road, ego on lane 1 at `x = 100`, vehicle 1 at 50 m ahead
/// on the same lane and vehicle 2 at 30 m behind on lane 2.
pub fn ahead_and_behind() -> MockScene {
    let mut road = StraightRoad::new(3);
    let ego = road.vehicle(EGO.0, 1, 100.0, 25.0).with_speed_index(1);
    let ahead = road.vehicle(1, 1, 150.0, 22.0);
    let behind = road.vehicle(2, 2, 70.0, 27.0);
    road.push(ego).push(ahead).push(behind);
    MockScene::new(road, EGO)
}

/// `count` other vehicles spread uniformly over `[-200, 200]` m around
/// the ego vehicle on a `lanes`-lane road, reproducible from `seed`.
pub fn random_traffic(seed: u64, lanes: usize, count: usize) -> MockScene {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut road = StraightRoad::new(lanes);
    let ego_lane = rng.gen_range(0..lanes);
    let ego = road
        .vehicle(EGO.0, ego_lane, 0.0, 25.0)
        .with_speed_index(1);
    road.push(ego);
    for id in 1..=count as u64 {
        let lane = rng.gen_range(0..lanes);
        let x = rng.gen_range(-200.0..200.0);
        let speed = rng.gen_range(SPEED_MIN..SPEED_MAX);
        let speed_index = rng.gen_range(0..SPEED_COUNT);
        let v = road
            .vehicle(id, lane, x, speed)
            .with_speed_index(speed_index);
        road.push(v);
    }
    MockScene::new(road, EGO)
}

/// Time-to-collision grid of shape
/// `(SPEED_COUNT, lanes, TtcGrid::time_buckets(horizon, time_quantization))`.
///
/// For every candidate ego speed and every other vehicle, the time to
/// reach the other vehicle (and its front and rear margins) at constant
/// speeds is quantized both down and up, and the corresponding cell of
/// the other vehicle's lane is raised to the collision cost (1.0 for a
/// centre hit, 0.5 for a margin hit).
pub fn straight_road_ttc_grid(scene: &dyn Scene, time_quantization: f64, horizon: f64) -> TtcGrid {
    let ego = scene.ego().state();
    let lanes = scene.road().side_lanes(&ego.lane_index).len();
    let times = TtcGrid::time_buckets(horizon, time_quantization);
    let mut grid = TtcGrid::zeros(SPEED_COUNT, lanes, times);
    let margin = VEHICLE_LENGTH;
    let collision_points = [(0.0, 1.0f32), (-margin, 0.5), (margin, 0.5)];

    for speed_index in 0..SPEED_COUNT {
        let ego_speed = speed_for_index(speed_index);
        for other in scene.road().vehicles() {
            let other = other.state();
            if other.id == ego.id || other.vx == ego_speed {
                continue;
            }
            let lane = other.lane_index.lane;
            if lane >= lanes {
                continue;
            }
            for (m, cost) in collision_points {
                let distance = other.x - ego.x + m;
                let ttc = distance / (ego_speed - other.vx);
                if ttc < 0.0 {
                    continue;
                }
                let steps = ttc / time_quantization;
                for time in [steps.floor() as usize, steps.ceil() as usize] {
                    if time < times && grid.get(speed_index, lane, time) < cost {
                        grid.set(speed_index, lane, time, cost);
                    }
                }
            }
        }
    }
    grid
}
