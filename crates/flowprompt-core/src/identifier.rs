//! Typed identifiers for flowchart items and the generators that allocate them.
//!
//! Nodes and edges are numbered independently with monotonically increasing
//! integers. The numbers are persisted verbatim, so the identifier types are
//! transparent over `u32` when serialized.
//!
//! Allocation goes through the [`IdGenerator`] trait so a store can be built
//! with any numbering policy; [`SequentialIds`] is the default.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a flowchart node.
///
/// # Examples
///
/// ```
/// use flowprompt_core::identifier::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.to_string(), "node#3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Identifier of a flowchart edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw numeric value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Source of fresh identifier values.
///
/// The value returned by [`peek`](IdGenerator::peek) is what gets persisted as
/// the counter of a saved flowchart; [`reset`](IdGenerator::reset) restores it
/// on load.
pub trait IdGenerator: fmt::Debug {
    /// Returns the next value and advances the generator, or `None` once the
    /// generator has no values left.
    fn next_id(&mut self) -> Option<u32>;

    /// Returns the value the next call to [`next_id`](IdGenerator::next_id) yields.
    fn peek(&self) -> u32;

    /// Positions the generator so that `next` is the next value handed out.
    fn reset(&mut self, next: u32);
}

/// Counter that hands out `0, 1, 2, ...`.
///
/// `u32::MAX` is never handed out: it is the counter value of an exhausted
/// sequence, so a persisted counter always names an unused identifier.
///
/// # Examples
///
/// ```
/// use flowprompt_core::identifier::{IdGenerator, SequentialIds};
///
/// let mut ids = SequentialIds::default();
/// assert_eq!(ids.next_id(), Some(0));
/// assert_eq!(ids.next_id(), Some(1));
/// assert_eq!(ids.peek(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    /// Creates a counter whose first value is `start`.
    pub fn starting_at(start: u32) -> Self {
        Self { next: start }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Option<u32> {
        let id = self.next;
        self.next = id.checked_add(1)?;
        Some(id)
    }

    fn peek(&self) -> u32 {
        self.next
    }

    fn reset(&mut self, next: u32) {
        self.next = next;
    }
}
