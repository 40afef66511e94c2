//! Benchmark scenes for the lanesight observation encoders.
//!
//! - [`reference_scene`]: 4-lane road with 50 vehicles around the ego
//! - [`dense_scene`]: 6-lane road with 400 vehicles, for scan-heavy encoders

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lanesight_core::{RgbFrame, Tensor};
use lanesight_test_utils::{fixtures, MockScene};

/// Frame height rendered by the benchmark scenes.
pub const FRAME_HEIGHT: usize = 64;

/// Frame width rendered by the benchmark scenes.
pub const FRAME_WIDTH: usize = 128;

/// Build the reference scene: 4 lanes, 50 vehicles, a goal, one
/// attribute and a preset rendered frame.
pub fn reference_scene(seed: u64) -> MockScene {
    decorate(fixtures::random_traffic(seed, 4, 50))
}

/// Build a dense scene: 6 lanes, 400 vehicles.
///
/// Same decorations as [`reference_scene`].
pub fn dense_scene(seed: u64) -> MockScene {
    decorate(fixtures::random_traffic(seed, 6, 400))
}

fn decorate(mut scene: MockScene) -> MockScene {
    scene.set_attribute("speed", Tensor::vector(vec![25.0]));
    scene.set_frame(RgbFrame::solid(FRAME_HEIGHT, FRAME_WIDTH, [0.3, 0.5, 0.7]));
    let goal = scene.road.vehicle(u64::MAX, 0, 300.0, 0.0);
    scene.with_goal(goal)
}
