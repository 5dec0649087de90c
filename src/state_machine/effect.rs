//! Effects produced by state transitions

use crate::collaborator::OutboundRequest;
use crate::session::Exchange;

/// Store mutations and I/O to perform after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Record the user's turn
    AppendUser { text: String },

    /// Mark the request as in flight
    BeginPending,

    /// Call the collaborator (runs on a background task)
    RequestCompletion { request: OutboundRequest },

    /// Record the answer or error and clear the in-flight flag
    Resolve { exchange: Exchange },
}
