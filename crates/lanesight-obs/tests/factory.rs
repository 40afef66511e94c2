//! Building every encoder from JSON and observing generated traffic.

use lanesight_core::{ObsError, RgbFrame, Tensor};
use lanesight_obs::{ObsConfig, ObsKind, ObservationType, Observer};
use lanesight_test_utils::{fixtures, MockScene};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rich_scene(seed: u64) -> MockScene {
    let mut scene = fixtures::random_traffic(seed, 4, 50);
    scene.set_attribute("heading_error", Tensor::vector(vec![0.1, -0.2]));
    scene.set_frame(RgbFrame::solid(8, 16, [0.2, 0.4, 0.6]));
    let goal = scene.road.vehicle(99, 3, 250.0, 0.0);
    scene.with_goal(goal)
}

const CONFIGS: [&str; 7] = [
    r#"{"type": "Kinematics", "vehicles_count": 7, "order": "shuffled", "see_behind": true}"#,
    r#"{"type": "OccupancyGrid", "grid_step": [2.5, 2.5]}"#,
    r#"{"type": "TimeToCollision", "horizon": 6}"#,
    r#"{"type": "SimplifiedKinematics", "lanes_count": 2}"#,
    r#"{"type": "KinematicsGoal", "features": ["x", "y", "vx"], "scales": [100, 4, 5]}"#,
    r#"{"type": "GrayscaleObservation", "observation_shape": [8, 16], "stack_size": 4}"#,
    r#"{"type": "AttributesObservation", "attributes": ["heading_error"]}"#,
];

#[test]
fn every_encoder_stays_inside_its_space() {
    for seed in 0..5 {
        let scene = rich_scene(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for json in CONFIGS {
            let mut observer = Observer::from_json(json, &scene).unwrap();
            for _ in 0..3 {
                let obs = observer.observe(&scene, &mut rng).unwrap();
                assert!(observer.space().contains(&obs), "{json} left its space");
            }
        }
    }
}

#[test]
fn kinds_follow_config_tags() {
    let scene = rich_scene(0);
    let kinds: Vec<ObsKind> = CONFIGS
        .iter()
        .map(|json| Observer::from_json(json, &scene).unwrap().kind())
        .collect();
    let registered: Vec<ObsKind> = ObsKind::REGISTRY.iter().map(|(_, k)| *k).collect();
    assert_eq!(kinds, registered);
}

#[test]
fn declared_shapes() {
    let scene = rich_scene(0);
    let shape = |json: &str| {
        Observer::from_json(json, &scene)
            .unwrap()
            .space()
            .shape()
            .map(<[usize]>::to_vec)
    };
    assert_eq!(shape(CONFIGS[0]), Some(vec![7, 5]));
    assert_eq!(shape(CONFIGS[1]), Some(vec![3, 22, 22]));
    assert_eq!(shape(CONFIGS[2]), Some(vec![3, 3, 6]));
    assert_eq!(shape(CONFIGS[3]), Some(vec![22]));
    assert_eq!(shape(CONFIGS[4]), None);
    assert_eq!(shape(CONFIGS[5]), Some(vec![8, 16, 4]));
    assert_eq!(shape(CONFIGS[6]), None);
}

#[test]
fn configuration_errors_surface_at_construction() {
    let scene = rich_scene(0);
    let cases = [
        r#"{"type": "Camera"}"#,
        r#"{"type": "Kinematics", "features": ["presence", "speed"]}"#,
        r#"{"type": "Kinematics", "vehicles_count": -1}"#,
        r#"{"type": "Kinematics", "features_range": {"x": [5, -5]}}"#,
        r#"{"type": "OccupancyGrid", "grid_step": [0, 5]}"#,
        r#"{"type": "TimeToCollision", "horizon": -1}"#,
        r#"{"type": "KinematicsGoal", "scales": [1, 2]}"#,
        r#"{"type": "GrayscaleObservation", "observation_shape": [8, 16]}"#,
        r#"{"type": "AttributesObservation", "attributes": ["missing"]}"#,
        r#"not json"#,
    ];
    for json in cases {
        let err = Observer::from_json(json, &scene).unwrap_err();
        assert!(err.is_configuration(), "{json}: {err}");
    }
}

#[test]
fn runtime_errors_are_not_configuration_errors() {
    let scene = fixtures::highway(3, 1);
    let mut observer = Observer::from_json(
        r#"{"type": "GrayscaleObservation", "observation_shape": [2, 2], "stack_size": 1}"#,
        &scene,
    )
    .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let err = observer.observe(&scene, &mut rng).unwrap_err();
    assert!(matches!(err, ObsError::Scene(_)));
    assert!(!err.is_configuration());
    assert!(std::error::Error::source(&err).is_some());
}
