//! Strongly-typed identifiers for vehicles and lanes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a vehicle within a scene.
///
/// Ids are assigned by the simulation and are stable for the lifetime
/// of the vehicle. Encoders use them to break distance ties
/// deterministically and to exclude the reference vehicle from its own
/// neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VehicleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a node of the road graph (a segment endpoint).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Position of a lane in the road graph: the segment it belongs to
/// (`from` → `to`) and its number within that segment, counted from
/// the leftmost lane.
///
/// # Examples
///
/// ```
/// use lanesight_core::{LaneIndex, NodeId};
///
/// let lane = LaneIndex::new(NodeId(0), NodeId(1), 2);
/// assert_eq!(lane.lane, 2);
/// assert_eq!(lane.with_lane(0).lane, 0);
/// assert_eq!(lane.to_string(), "(0, 1, 2)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneIndex {
    /// Segment start node.
    pub from: NodeId,
    /// Segment end node.
    pub to: NodeId,
    /// Lane number within the segment.
    pub lane: usize,
}

impl LaneIndex {
    /// Build a lane index from its three components.
    pub fn new(from: NodeId, to: NodeId, lane: usize) -> Self {
        Self { from, to, lane }
    }

    /// The sibling lane with number `lane` on the same segment.
    pub fn with_lane(&self, lane: usize) -> Self {
        Self { lane, ..*self }
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.lane)
    }
}
