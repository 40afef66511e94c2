//! Nearest vehicle ahead of and behind the ego vehicle in each lane of a
//! window around its own.
//!
//! The window spans `2 * lanes_count + 1` lanes, left to right. Each lane
//! owns two `(x, vx)` slots: the closest vehicle behind and the closest
//! ahead. Empty slots hold a far-away default drawn once per call, so an
//! agent cannot tell a free lane from a vehicle at the default distance
//! by an exact sentinel value.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};
use tracing::{debug, trace, warn};

use lanesight_core::{Feature, ObsError, Scene, Tensor, Vehicle, VehicleRecord};

use crate::config::{ObsKind, SimplifiedKinematicsConfig};
use crate::normalize::{lmap, lmap_clipped};
use crate::observer::ObservationType;
use crate::range::{FeatureRange, RoadFacts};
use crate::space::{ObsSpace, Observation};

/// Standard deviation of the default-distance sampler.
const DEFAULT_SIGMA: f64 = 0.1;

/// Draws before the truncated sampler falls back to the mean.
const MAX_DRAWS: usize = 64;

/// A single `(x, vx)` slot.
type Slot = [f64; 2];

/// Encoder producing a flat `6 + 8 * lanes_count` vector of lane-relative
/// gaps.
#[derive(Clone, Debug)]
pub struct SimplifiedKinematicsObservation {
    config: SimplifiedKinematicsConfig,
    range: FeatureRange,
    lane_bounds: (f64, f64),
    x_bounds: (f64, f64),
    vx_bounds: (f64, f64),
    space: ObsSpace,
}

/// Sample `N(mean, DEFAULT_SIGMA)` truncated to `|x - mean| < 2σ`.
///
/// After [`MAX_DRAWS`] rejections the mean itself is returned.
fn truncated_normal<R: Rng + ?Sized>(normal: &Normal<f64>, rng: &mut R) -> f64 {
    let mean = normal.mean();
    for _ in 0..MAX_DRAWS {
        let x = normal.sample(rng);
        if (x - mean).abs() < 2.0 * normal.std_dev() {
            return x;
        }
    }
    warn!(mean, draws = MAX_DRAWS, "truncated sampler exhausted, using mean");
    mean
}

fn draw(mean: f64, rng: &mut dyn RngCore) -> Result<f64, ObsError> {
    let normal = Normal::new(mean, DEFAULT_SIGMA)
        .map_err(|e| ObsError::execution(format!("SimplifiedKinematics: sampler: {e}")))?;
    Ok(truncated_normal(&normal, rng))
}

impl SimplifiedKinematicsObservation {
    /// Build the encoder, deriving the lane-number range from the scene's
    /// current road when none is configured.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] if a configured range lacks
    /// `lane_index`, `x` or `vx`, or has bad bounds.
    pub fn new(config: SimplifiedKinematicsConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let facts = RoadFacts::from_scene(scene);
        let range = FeatureRange::resolve(config.features_range.as_ref(), || {
            FeatureRange::lane_relative(facts, scene.speed_max())
        })?;
        let bounds = |f: Feature| {
            range.get(f).ok_or_else(|| {
                ObsError::config(format!("SimplifiedKinematics: no range for '{f}'"))
            })
        };
        let lane_bounds = bounds(Feature::LaneIndex)?;
        let x_bounds = bounds(Feature::X)?;
        let vx_bounds = bounds(Feature::Vx)?;

        let len = 6 + 8 * config.lanes_count;
        let space = if config.normalize && config.clip {
            ObsSpace::bounded(&[len], -1.0, 1.0)
        } else {
            ObsSpace::unbounded(&[len])
        };
        debug!(
            kind = %ObsKind::SimplifiedKinematics,
            len,
            lanes_count = config.lanes_count,
            "encoder constructed"
        );
        Ok(Self {
            config,
            range,
            lane_bounds,
            x_bounds,
            vx_bounds,
            space,
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &SimplifiedKinematicsConfig {
        &self.config
    }

    /// The resolved normalization range.
    pub fn range(&self) -> &FeatureRange {
        &self.range
    }

    /// Draw the default behind and ahead slots.
    fn defaults(&self, rng: &mut dyn RngCore) -> Result<(Slot, Slot), ObsError> {
        let (x_lo, x_hi) = self.x_bounds;
        let (vx_lo, vx_hi) = self.vx_bounds;
        let behind = [draw(0.8 * x_lo, rng)?, draw(0.5 * vx_lo, rng)?];
        let ahead = [draw(0.8 * x_hi, rng)?, draw(0.5 * vx_hi, rng)?];
        Ok((behind, ahead))
    }

    /// `[behind, ahead]` slots of every live lane after scanning traffic.
    fn scan(
        scene: &dyn Scene,
        ego: &dyn Vehicle,
        lanes: usize,
        defaults: (Slot, Slot),
    ) -> Vec<[Slot; 2]> {
        let mut slots = vec![[defaults.0, defaults.1]; lanes];
        let mut candidates: Vec<VehicleRecord> = scene
            .road()
            .close_vehicles_to(ego, scene.perception_distance(), None, true)
            .into_iter()
            .map(|v| v.to_record(Some(ego), false))
            .collect();
        candidates.sort_by(|a, b| a.x.abs().total_cmp(&b.x.abs()).then(a.id.cmp(&b.id)));
        trace!(candidates = candidates.len(), "simplified scan");

        for record in &candidates {
            let Some([behind, ahead]) = slots.get_mut(record.lane_index.lane) else {
                continue;
            };
            if record.x < 0.0 && record.x > behind[0] {
                *behind = [record.x, record.vx];
            } else if record.x > 0.0 && record.x < ahead[0] {
                *ahead = [record.x, record.vx];
            }
        }
        slots
    }

    fn normalize(&self, rows: &mut [Slot]) {
        let clip = self.config.clip;
        let map = |v: f64, from: (f64, f64), to: (f64, f64)| {
            if clip {
                lmap_clipped(v, from, to)
            } else {
                lmap(v, from, to)
            }
        };
        rows[0][0] = map(rows[0][0], self.lane_bounds, (0.0, 1.0));
        for row in rows.iter_mut().skip(1) {
            row[0] = map(row[0], self.x_bounds, (-1.0, 1.0));
        }
        for row in rows.iter_mut() {
            row[1] = map(row[1], self.vx_bounds, (-1.0, 1.0));
        }
    }
}

impl ObservationType for SimplifiedKinematicsObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::SimplifiedKinematics
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let defaults = self.defaults(rng)?;
        let ego = scene.ego();
        let ego_state = ego.state();
        let live = scene.road().side_lanes(&ego_state.lane_index).len();
        if live == 0 {
            return Err(ObsError::execution(
                "SimplifiedKinematics: ego lane has no side lanes",
            ));
        }
        let slots = Self::scan(scene, ego, live, defaults);

        let side = self.config.lanes_count as isize;
        let ego_lane = ego_state.lane_index.lane as isize;
        let mut rows: Vec<Slot> = Vec::with_capacity(3 + 4 * self.config.lanes_count);
        rows.push([ego_lane as f64, ego_state.vx]);
        for lane in (ego_lane - side)..=(ego_lane + side) {
            let clamped = lane.clamp(0, live as isize - 1) as usize;
            rows.extend(slots[clamped]);
        }

        if self.config.normalize {
            self.normalize(&mut rows);
        }
        let data = rows.into_iter().flatten().map(|v| v as f32).collect();
        Ok(Tensor::vector(data).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use lanesight_test_utils::fixtures;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn raw(lanes_count: usize) -> SimplifiedKinematicsConfig {
        SimplifiedKinematicsConfig {
            lanes_count,
            normalize: false,
            ..Default::default()
        }
    }

    fn observe(config: SimplifiedKinematicsConfig, scene: &dyn Scene, seed: u64) -> Vec<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut obs = SimplifiedKinematicsObservation::new(config, scene).unwrap();
        obs.observe(scene, &mut rng)
            .unwrap()
            .into_tensor()
            .unwrap()
            .into_vec()
    }

    #[test]
    fn length_is_six_plus_eight_per_lane() {
        let scene = fixtures::highway(5, 2);
        for lanes_count in 0..3 {
            let v = observe(raw(lanes_count), &scene, 0);
            assert_eq!(v.len(), 6 + 8 * lanes_count);
        }
    }

    #[test]
    fn ego_row_holds_lane_and_speed() {
        let scene = fixtures::ahead_and_behind();
        let v = observe(raw(1), &scene, 0);
        assert_eq!(&v[..2], &[1.0, 25.0]);
    }

    #[test]
    fn nearest_vehicles_fill_their_lanes() {
        let scene = fixtures::ahead_and_behind();
        let v = observe(raw(1), &scene, 0);
        // Window lanes 0, 1, 2 → rows 1..=6.
        // Lane 1 ahead (row 4): vehicle 1, 50 m ahead, 3 m/s slower.
        assert_eq!(&v[8..10], &[50.0, -3.0]);
        // Lane 2 behind (row 5): vehicle 2, 30 m behind, 2 m/s faster.
        assert_eq!(&v[10..12], &[-30.0, 2.0]);
    }

    #[test]
    fn closer_vehicle_wins_the_slot() {
        let mut scene = fixtures::ahead_and_behind();
        let closer = scene.road.vehicle(3, 1, 120.0, 24.0);
        scene.road.push(closer);
        let v = observe(raw(1), &scene, 0);
        assert_eq!(&v[8..10], &[20.0, -1.0]);
    }

    #[test]
    fn equal_distance_goes_to_lower_id() {
        for ids in [[5, 3], [3, 5]] {
            let mut scene = fixtures::ahead_and_behind();
            for id in ids {
                let speed = if id == 3 { 24.0 } else { 20.0 };
                let tied = scene.road.vehicle(id, 1, 130.0, speed);
                scene.road.push(tied);
            }
            let v = observe(raw(1), &scene, 0);
            assert_eq!(&v[8..10], &[30.0, -1.0], "insertion order {ids:?}");
        }
    }

    #[test]
    fn empty_slots_hold_sampled_defaults() {
        let scene = fixtures::highway(3, 1);
        let v = observe(raw(1), &scene, 3);
        // x range ±150, vx range ±60: behind x ≈ -120, vx ≈ -30.
        for row in [1, 3, 5] {
            assert!((v[2 * row] as f64 + 120.0).abs() < 0.2);
            assert!((v[2 * row + 1] as f64 + 30.0).abs() < 0.2);
        }
        for row in [2, 4, 6] {
            assert!((v[2 * row] as f64 - 120.0).abs() < 0.2);
            assert!((v[2 * row + 1] as f64 - 30.0).abs() < 0.2);
        }
        // One draw per kind, broadcast.
        assert_eq!(v[2], v[6]);
        assert_eq!(v[4], v[8]);
    }

    #[test]
    fn window_past_edge_copies_nearest_lane() {
        let mut scene = fixtures::highway(2, 0);
        let ahead = scene.road.vehicle(1, 0, 30.0, 25.0);
        scene.road.push(ahead);
        let v = observe(raw(1), &scene, 0);
        // Window lanes -1, 0, 1: lane -1 copies lane 0.
        assert_eq!(&v[2..6], &v[6..10]);
        assert_eq!(&v[8..10], &[30.0, 0.0]);
    }

    #[test]
    fn window_past_right_edge_copies_last_lane() {
        let mut scene = fixtures::highway(2, 1);
        let behind = scene.road.vehicle(1, 1, -20.0, 25.0);
        scene.road.push(behind);
        let v = observe(raw(1), &scene, 0);
        // Window lanes 0, 1, 2: lane 2 copies lane 1.
        assert_eq!(&v[10..14], &v[6..10]);
        assert_eq!(&v[6..8], &[-20.0, 0.0]);
    }

    #[test]
    fn normalized_output_is_bounded() {
        let scene = fixtures::random_traffic(11, 4, 40);
        let v = observe(SimplifiedKinematicsConfig::default(), &scene, 5);
        assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn lane_number_maps_to_unit_interval() {
        let scene = fixtures::highway(5, 4);
        let v = observe(SimplifiedKinematicsConfig::default(), &scene, 0);
        assert_eq!(v[0], 1.0);
        let scene = fixtures::highway(1, 0);
        let v = observe(SimplifiedKinematicsConfig::default(), &scene, 0);
        assert_eq!(v[0], 0.0);
    }

    #[test]
    fn configured_range_must_cover_required_features() {
        let scene = fixtures::highway(3, 1);
        let mut bounds = IndexMap::new();
        bounds.insert(Feature::X, [-100.0, 100.0]);
        let config = SimplifiedKinematicsConfig {
            features_range: Some(bounds),
            ..Default::default()
        };
        let err = SimplifiedKinematicsObservation::new(config, &scene).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn sampler_stays_inside_truncation() {
        let normal = Normal::new(5.0, DEFAULT_SIGMA).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let x = truncated_normal(&normal, &mut rng);
            assert!((x - 5.0).abs() < 2.0 * DEFAULT_SIGMA);
        }
    }
}
