//! Rolling stack of grayscale rendered frames.

use rand::RngCore;
use tracing::debug;

use lanesight_core::{ObsError, Scene, Tensor};

use crate::config::{GrayscaleConfig, ObsKind};
use crate::observer::ObservationType;
use crate::space::{ObsSpace, Observation};

/// Encoder keeping the last `stack_size` frames as an `(H, W, stack)`
/// tensor, newest at the last index.
///
/// This is the only encoder whose output depends on earlier calls; call
/// [`reset`](ObservationType::reset) between episodes.
#[derive(Clone, Debug)]
pub struct GrayscaleObservation {
    config: GrayscaleConfig,
    space: ObsSpace,
    stack: Tensor,
}

impl GrayscaleObservation {
    /// Build the encoder with an all-zero stack.
    ///
    /// # Errors
    ///
    /// [`ObsError::InvalidConfig`] for an empty frame shape, a zero
    /// stack size or negative weights.
    pub fn new(config: GrayscaleConfig, _scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let [height, width] = config.observation_shape;
        let shape = [height, width, config.stack_size];
        let high = config.weights.iter().sum::<f32>().max(1.0);
        debug!(kind = %ObsKind::Grayscale, ?shape, "encoder constructed");
        Ok(Self {
            space: ObsSpace::bounded(&shape, 0.0, high),
            stack: Tensor::zeros(&shape),
            config,
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &GrayscaleConfig {
        &self.config
    }
}

impl ObservationType for GrayscaleObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::Grayscale
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        _rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let frame = scene.render_rgb()?;
        let [height, width] = self.config.observation_shape;
        if frame.height() != height || frame.width() != width {
            return Err(ObsError::execution(format!(
                "GrayscaleObservation: rendered {}x{}, expected {height}x{width}",
                frame.height(),
                frame.width()
            )));
        }
        let gray = frame.grayscale(self.config.weights);
        let depth = self.config.stack_size;
        for (pixel, value) in self.stack.as_mut_slice().chunks_exact_mut(depth).zip(gray) {
            pixel.rotate_left(1);
            pixel[depth - 1] = value;
        }
        Ok(self.stack.clone().into())
    }

    fn reset(&mut self) {
        self.stack.fill(0.0);
    }
}
