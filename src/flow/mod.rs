//! Escape analysis for resource handles.
//!
//! The [`FlowTracker`] answers one question: starting from an expression
//! that acquires a resource, does that value reach a sink (used as a call
//! receiver, returned, stored into a field, or passed as an argument)
//! before the end of the surrounding scope? It is a best-effort, single
//! forward walk over the unified AST: no control-flow graph, no fixpoint.
//! When a reference cannot be resolved the analysis simply stops seeing the
//! relationship, which callers must read as "can no longer prove a leak".

mod tracker;

pub use tracker::{get_variable_element, FlowReport, FlowTracker};

use crate::uast::{DeclId, NodeId};
use std::collections::HashSet;

/// How a tracked value was consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Used as the receiver of a (non-seed) call
    Receiver,
    /// Returned out of the scope being analyzed
    Returns,
    /// Stored into a field
    Field,
    /// Passed as an argument to a call
    Argument,
}

/// One observed consumption of the tracked value.
///
/// `call` is the consuming call for [`SinkKind::Receiver`] and
/// [`SinkKind::Argument`]; `node` is the expression that carried the value.
#[derive(Debug, Clone, Copy)]
pub struct SinkEvent {
    pub kind: SinkKind,
    pub node: NodeId,
    pub call: Option<NodeId>,
}

/// Mutable tracking state for one traversal.
///
/// `instances` holds expression nodes currently known to evaluate to the
/// traced value; `references` holds declarations currently aliasing it.
/// Both sets only grow during the walk (see the reassignment note in the
/// tracker).
#[derive(Debug, Default)]
pub struct FlowState {
    pub instances: HashSet<NodeId>,
    pub references: HashSet<DeclId>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }
}
