//! Scenario tests for the kinematic table encoder, run through the
//! factory the way an environment builds it.

use lanesight_core::{Scene, Tensor};
use lanesight_obs::{
    KinematicsConfig, ObsConfig, ObservationType, Observer, VehicleOrder,
};
use lanesight_test_utils::fixtures;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn build(config: KinematicsConfig, scene: &dyn Scene) -> Observer {
    Observer::new(&ObsConfig::Kinematics(config), scene).unwrap()
}

fn table(observer: &mut Observer, scene: &dyn Scene, rng: &mut ChaCha8Rng) -> Tensor {
    observer
        .observe(scene, rng)
        .unwrap()
        .into_tensor()
        .unwrap()
}

fn rows(t: &Tensor) -> Vec<Vec<f32>> {
    (0..t.shape()[0]).map(|i| t.row(i).to_vec()).collect()
}

fn sorted_rows(mut rows: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
    rows.sort_by(|a, b| {
        a.iter()
            .zip(b)
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

// ── Ahead / behind scenario ─────────────────────────────────

fn scenario_config(see_behind: bool) -> KinematicsConfig {
    KinematicsConfig {
        vehicles_count: 5,
        order: VehicleOrder::Sorted,
        normalize: false,
        see_behind,
        ..Default::default()
    }
}

#[test]
fn without_see_behind_only_the_leader_is_listed() {
    let scene = fixtures::ahead_and_behind();
    let mut observer = build(scenario_config(false), &scene);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t = table(&mut observer, &scene, &mut rng);

    assert_eq!(t.shape(), &[5, 5]);
    assert_eq!(t.row(0), &[1.0, 100.0, 4.0, 25.0, 0.0]);
    assert_eq!(t.row(1), &[1.0, 50.0, 0.0, -3.0, 0.0]);
    for i in 2..5 {
        assert_eq!(t.row(i), &[0.0; 5]);
    }
}

#[test]
fn with_see_behind_nearest_comes_first() {
    let scene = fixtures::ahead_and_behind();
    let mut observer = build(scenario_config(true), &scene);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let t = table(&mut observer, &scene, &mut rng);

    assert_eq!(t.row(1), &[1.0, -30.0, 4.0, 2.0, 0.0]);
    assert_eq!(t.row(2), &[1.0, 50.0, 0.0, -3.0, 0.0]);
    for i in 3..5 {
        assert_eq!(t.row(i), &[0.0; 5]);
    }
}

#[test]
fn observing_twice_is_idempotent() {
    let scene = fixtures::random_traffic(3, 4, 30);
    let mut observer = build(KinematicsConfig::default(), &scene);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let a = table(&mut observer, &scene, &mut rng);
    let b = table(&mut observer, &scene, &mut rng);
    assert_eq!(a, b);
}

// ── Shuffled order ──────────────────────────────────────────

fn dense_config(order: VehicleOrder) -> KinematicsConfig {
    KinematicsConfig {
        vehicles_count: 8,
        order,
        see_behind: true,
        ..Default::default()
    }
}

#[test]
fn shuffled_is_a_permutation_of_sorted() {
    let scene = fixtures::random_traffic(21, 4, 40);
    let mut sorted = build(dense_config(VehicleOrder::Sorted), &scene);
    let mut shuffled = build(dense_config(VehicleOrder::Shuffled), &scene);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let reference = table(&mut sorted, &scene, &mut rng);
    let permuted = table(&mut shuffled, &scene, &mut rng);

    assert_eq!(reference.row(0), permuted.row(0));
    let tail = |t: &Tensor| sorted_rows(rows(t).split_off(1));
    assert_eq!(tail(&reference), tail(&permuted));
}

#[test]
fn shuffled_order_changes_between_calls() {
    let scene = fixtures::random_traffic(21, 4, 40);
    let mut shuffled = build(dense_config(VehicleOrder::Shuffled), &scene);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let first = table(&mut shuffled, &scene, &mut rng);
    let differs = (0..10).any(|_| table(&mut shuffled, &scene, &mut rng) != first);
    assert!(differs, "shuffled table never changed order");
}

#[test]
fn shuffled_is_reproducible_for_a_seed() {
    let scene = fixtures::random_traffic(21, 4, 40);
    let run = |seed| {
        let mut observer = build(dense_config(VehicleOrder::Shuffled), &scene);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        table(&mut observer, &scene, &mut rng)
    };
    assert_eq!(run(5), run(5));
}

// ── Shape invariance ────────────────────────────────────────

proptest! {
    #[test]
    fn shape_and_padding_hold_for_any_traffic(
        seed in any::<u64>(),
        lanes in 1usize..6,
        traffic in 0usize..40,
        vehicles_count in 0usize..10,
        see_behind in any::<bool>(),
    ) {
        let scene = fixtures::random_traffic(seed, lanes, traffic);
        let config = KinematicsConfig { vehicles_count, see_behind, ..Default::default() };
        let mut observer = build(config, &scene);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let obs = observer.observe(&scene, &mut rng).unwrap();
        prop_assert!(observer.space().contains(&obs));

        let t = obs.into_tensor().unwrap();
        prop_assert_eq!(t.shape(), &[vehicles_count, 5]);

        let visible = scene
            .road()
            .close_vehicles_to(scene.ego(), scene.perception_distance(), None, see_behind)
            .len();
        let filled = vehicles_count.min(1 + visible);
        for i in 0..vehicles_count {
            let presence = t.row(i)[0];
            if i < filled {
                prop_assert_eq!(presence, 1.0);
            } else {
                prop_assert!(t.row(i).iter().all(|&v| v == 0.0));
            }
        }
    }
}
