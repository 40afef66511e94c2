//! Declared observation spaces and the values encoders produce.

use indexmap::IndexMap;

use lanesight_core::{Shape, Tensor};

/// Element type of an observation tensor.
///
/// Every encoder currently emits `F32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObsDtype {
    /// 32-bit float.
    F32,
}

/// Shape, bounds, and dtype of an encoder's output.
///
/// For a given encoder instance the space never changes between ticks.
///
/// # Examples
///
/// ```
/// use lanesight_core::Tensor;
/// use lanesight_obs::{Observation, ObsSpace};
///
/// let space = ObsSpace::bounded(&[5, 5], -1.0, 1.0);
/// assert_eq!(space.shape(), Some(&[5usize, 5][..]));
/// assert!(space.contains(&Observation::Tensor(Tensor::zeros(&[5, 5]))));
/// assert!(!space.contains(&Observation::Tensor(Tensor::zeros(&[4, 5]))));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ObsSpace {
    /// A dense tensor with uniform element bounds.
    Box {
        /// Tensor dimensions.
        shape: Shape,
        /// Inclusive lower bound of every element.
        low: f32,
        /// Inclusive upper bound of every element.
        high: f32,
        /// Element type.
        dtype: ObsDtype,
    },
    /// Named sub-spaces, in declaration order.
    Dict(IndexMap<String, ObsSpace>),
}

impl ObsSpace {
    /// A bounded `f32` box.
    pub fn bounded(shape: &[usize], low: f32, high: f32) -> Self {
        Self::Box {
            shape: Shape::from_slice(shape),
            low,
            high,
            dtype: ObsDtype::F32,
        }
    }

    /// An `f32` box without finite bounds.
    pub fn unbounded(shape: &[usize]) -> Self {
        Self::bounded(shape, f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Tensor shape of a `Box` space, `None` for `Dict`.
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Self::Box { shape, .. } => Some(shape),
            Self::Dict(_) => None,
        }
    }

    /// Total element count of a `Box`, or the sum over a `Dict`.
    pub fn flat_len(&self) -> usize {
        match self {
            Self::Box { shape, .. } => shape.iter().product(),
            Self::Dict(spaces) => spaces.values().map(ObsSpace::flat_len).sum(),
        }
    }

    /// Whether `obs` matches this space structurally and every element
    /// lies within the bounds.
    pub fn contains(&self, obs: &Observation) -> bool {
        match (self, obs) {
            (Self::Box { .. }, Observation::Tensor(t)) => self.contains_tensor(t),
            (Self::Dict(spaces), Observation::Dict(values)) => {
                spaces.len() == values.len()
                    && spaces.iter().all(|(name, space)| {
                        values
                            .get(name)
                            .is_some_and(|t| space.contains_tensor(t))
                    })
            }
            _ => false,
        }
    }

    fn contains_tensor(&self, tensor: &Tensor) -> bool {
        match self {
            Self::Box {
                shape, low, high, ..
            } => {
                tensor.shape() == shape.as_slice()
                    && tensor.as_slice().iter().all(|v| *v >= *low && *v <= *high)
            }
            Self::Dict(_) => false,
        }
    }
}

/// The value produced by one `observe()` call.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    /// A single dense tensor.
    Tensor(Tensor),
    /// Named tensors, in the encoder's declaration order.
    Dict(IndexMap<String, Tensor>),
}

impl Observation {
    /// The tensor of a `Tensor` observation.
    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Self::Tensor(t) => Some(t),
            Self::Dict(_) => None,
        }
    }

    /// The named entries of a `Dict` observation.
    pub fn as_dict(&self) -> Option<&IndexMap<String, Tensor>> {
        match self {
            Self::Tensor(_) => None,
            Self::Dict(d) => Some(d),
        }
    }

    /// Consume a `Tensor` observation.
    pub fn into_tensor(self) -> Option<Tensor> {
        match self {
            Self::Tensor(t) => Some(t),
            Self::Dict(_) => None,
        }
    }
}

impl From<Tensor> for Observation {
    fn from(t: Tensor) -> Self {
        Self::Tensor(t)
    }
}
