//! Pass-through of named values the environment already computes.

use indexmap::IndexMap;
use rand::RngCore;
use tracing::debug;

use lanesight_core::{ObsError, Scene, Tensor};

use crate::config::{AttributesConfig, ObsKind};
use crate::observer::ObservationType;
use crate::space::{ObsSpace, Observation};

/// Encoder returning a `Dict` of scene attributes, keyed by name.
///
/// Each attribute's shape is fixed when the encoder is built.
#[derive(Clone, Debug)]
pub struct AttributesObservation {
    config: AttributesConfig,
    space: ObsSpace,
}

impl AttributesObservation {
    /// Probe every attribute on `scene` and record its shape.
    ///
    /// # Errors
    ///
    /// - [`ObsError::InvalidConfig`] for an empty or duplicated list.
    /// - [`ObsError::MissingAttribute`] if the scene lacks a name.
    pub fn new(config: AttributesConfig, scene: &dyn Scene) -> Result<Self, ObsError> {
        config.validate()?;
        let mut spaces = IndexMap::with_capacity(config.attributes.len());
        for name in &config.attributes {
            let value = fetch(scene, name)?;
            spaces.insert(name.clone(), ObsSpace::unbounded(value.shape()));
        }
        debug!(
            kind = %ObsKind::Attributes,
            attributes = ?config.attributes,
            "encoder constructed"
        );
        Ok(Self {
            config,
            space: ObsSpace::Dict(spaces),
        })
    }

    /// The options this encoder was built with.
    pub fn config(&self) -> &AttributesConfig {
        &self.config
    }
}

fn fetch(scene: &dyn Scene, name: &str) -> Result<Tensor, ObsError> {
    scene
        .attribute(name)
        .ok_or_else(|| ObsError::MissingAttribute {
            name: name.to_owned(),
        })
}

impl ObservationType for AttributesObservation {
    fn kind(&self) -> ObsKind {
        ObsKind::Attributes
    }

    fn space(&self) -> &ObsSpace {
        &self.space
    }

    fn observe(
        &mut self,
        scene: &dyn Scene,
        _rng: &mut dyn RngCore,
    ) -> Result<Observation, ObsError> {
        let ObsSpace::Dict(spaces) = &self.space else {
            return Err(ObsError::execution("AttributesObservation: space is not a Dict"));
        };
        let mut out = IndexMap::with_capacity(spaces.len());
        for (name, space) in spaces {
            let value = fetch(scene, name)?;
            if space.shape() != Some(value.shape()) {
                return Err(ObsError::execution(format!(
                    "AttributesObservation: '{name}' changed shape from {:?} to {:?}",
                    space.shape().unwrap_or_default(),
                    value.shape()
                )));
            }
            out.insert(name.clone(), value);
        }
        Ok(Observation::Dict(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanesight_test_utils::fixtures;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scene() -> lanesight_test_utils::MockScene {
        let mut scene = fixtures::highway(3, 1);
        scene.set_attribute("time", Tensor::vector(vec![12.5]));
        scene.set_attribute("lane_costs", Tensor::zeros(&[2, 3]));
        scene
    }

    fn config() -> AttributesConfig {
        AttributesConfig {
            attributes: vec!["lane_costs".into(), "time".into()],
        }
    }

    #[test]
    fn space_records_shapes_seen_at_build() {
        let scene = scene();
        let obs = AttributesObservation::new(config(), &scene).unwrap();
        let ObsSpace::Dict(spaces) = obs.space() else {
            panic!("expected Dict space");
        };
        assert_eq!(spaces["lane_costs"].shape(), Some(&[2usize, 3][..]));
        assert_eq!(spaces["time"].shape(), Some(&[1usize][..]));
        assert_eq!(spaces.keys().next().map(String::as_str), Some("lane_costs"));
    }

    #[test]
    fn observe_returns_current_values() {
        let mut scene = scene();
        let mut obs = AttributesObservation::new(config(), &scene).unwrap();
        scene.set_attribute("time", Tensor::vector(vec![13.0]));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = obs.observe(&scene, &mut rng).unwrap();
        assert_eq!(out.as_dict().unwrap()["time"].as_slice(), &[13.0]);
        assert!(obs.space().contains(&out));
    }

    #[test]
    fn missing_at_construction_is_reported() {
        let scene = fixtures::highway(3, 1);
        let err = AttributesObservation::new(config(), &scene).unwrap_err();
        assert_eq!(
            err,
            ObsError::MissingAttribute {
                name: "lane_costs".into()
            }
        );
    }

    #[test]
    fn attribute_vanishing_later_is_reported() {
        let mut scene = scene();
        let mut obs = AttributesObservation::new(config(), &scene).unwrap();
        scene.remove_attribute("time");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = obs.observe(&scene, &mut rng).unwrap_err();
        assert!(matches!(err, ObsError::MissingAttribute { name } if name == "time"));
    }

    #[test]
    fn shape_change_is_rejected() {
        let mut scene = scene();
        let mut obs = AttributesObservation::new(config(), &scene).unwrap();
        scene.set_attribute("time", Tensor::vector(vec![1.0, 2.0]));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = obs.observe(&scene, &mut rng).unwrap_err();
        assert!(matches!(err, ObsError::ExecutionFailed { .. }));
    }
}
