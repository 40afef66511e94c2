//! Core types and traits for the lanesight observation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every encoder: vehicle and lane identifiers,
//! the fixed-schema [`VehicleRecord`], dense [`Tensor`] buffers, error
//! types, and the read-only collaborator traits ([`Vehicle`], [`Road`],
//! [`Scene`]) through which encoders see the simulation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod id;
pub mod record;
pub mod tensor;
pub mod traits;

pub use error::{ObsError, SceneError};
pub use grid::{RgbFrame, TtcGrid};
pub use id::{LaneIndex, NodeId, VehicleId};
pub use record::{Feature, VehicleRecord};
pub use tensor::{Shape, Tensor};
pub use traits::{Road, Scene, Vehicle, DEFAULT_LANE_WIDTH, DEFAULT_SPEED_MAX};
