//! Occupancy and time-to-collision grids over generated traffic.

use lanesight_core::{ObsError, Scene, Tensor};
use lanesight_obs::{
    ObsConfig, ObservationType, Observer, OccupancyGridConfig, TimeToCollisionConfig,
};
use lanesight_test_utils::fixtures;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn observe(observer: &mut Observer, scene: &dyn Scene) -> Result<Tensor, ObsError> {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    observer
        .observe(scene, &mut rng)
        .map(|o| o.into_tensor().unwrap())
}

// ── Occupancy grid ──────────────────────────────────────────

#[test]
fn identical_scenes_give_identical_grids() {
    let a = fixtures::random_traffic(5, 3, 60);
    let b = fixtures::random_traffic(5, 3, 60);
    let config = ObsConfig::OccupancyGrid(OccupancyGridConfig::default());
    let mut first = Observer::new(&config, &a).unwrap();
    let mut second = Observer::new(&config, &b).unwrap();
    assert_eq!(observe(&mut first, &a).unwrap(), observe(&mut second, &b).unwrap());
}

#[test]
fn repeated_observe_does_not_accumulate() {
    let scene = fixtures::random_traffic(8, 3, 60);
    let config = ObsConfig::OccupancyGrid(OccupancyGridConfig::default());
    let mut observer = Observer::new(&config, &scene).unwrap();
    let first = observe(&mut observer, &scene).unwrap();
    for _ in 0..3 {
        assert_eq!(observe(&mut observer, &scene).unwrap(), first);
    }
}

#[test]
fn emptied_road_clears_the_grid() {
    let mut scene = fixtures::random_traffic(8, 3, 60);
    let config = ObsConfig::OccupancyGrid(OccupancyGridConfig::default());
    let mut observer = Observer::new(&config, &scene).unwrap();
    observe(&mut observer, &scene).unwrap();

    let ego = scene.ego_id;
    scene.road.vehicles.retain(|v| v.id == ego);
    let t = observe(&mut observer, &scene).unwrap();
    let occupied = t.row(0).iter().filter(|&&v| v != 0.0).count();
    assert_eq!(occupied, 1);
}

#[test]
fn absolute_occupancy_is_unsupported() {
    let scene = fixtures::highway(3, 1);
    let config = ObsConfig::from_json(r#"{"type": "OccupancyGrid", "absolute": true}"#).unwrap();
    let mut observer = Observer::new(&config, &scene).unwrap();
    let err = observe(&mut observer, &scene).unwrap_err();
    assert!(matches!(err, ObsError::UnsupportedMode { .. }));
    assert!(!err.is_configuration());
}

// ── Time to collision ───────────────────────────────────────

proptest! {
    #[test]
    fn ttc_shape_is_fixed_at_grid_boundaries(
        seed in any::<u64>(),
        lanes in 1usize..6,
        ego_lane in 0usize..8,
        speed_index in 0usize..6,
        frequency in prop::sample::select(vec![1u32, 2, 5]),
        tenths in 10u32..120,
    ) {
        let horizon = f64::from(tenths) / 10.0;
        let frequency_hz = f64::from(frequency);
        let mut scene = fixtures::random_traffic(seed, lanes, 20).with_policy_frequency(frequency_hz);
        let lane = scene.road.lane(ego_lane);
        scene.ego_mut().lane = lane;
        scene.ego_mut().speed_index = speed_index;

        let config = ObsConfig::TimeToCollision(TimeToCollisionConfig { horizon });
        let mut observer = Observer::new(&config, &scene).unwrap();
        let obs = observer.observe(&scene, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert!(observer.space().contains(&obs));

        let t = obs.into_tensor().unwrap();
        let times = (tenths * frequency / 10) as usize;
        prop_assert_eq!(t.shape(), &[3, 3, times]);
        if ego_lane == 0 || ego_lane > lanes {
            // The left neighbour lane is off the road.
            prop_assert!((0..3).all(|s| (0..times).all(|k| t.get(&[s, 0, k]) == Some(1.0))));
        }
    }
}
