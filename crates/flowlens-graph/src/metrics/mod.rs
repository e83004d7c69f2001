//! Structural and interaction metrics over a flow graph.
//!
//! - **Navigation** (`navigation`): how wide and deep is the prototype, and
//!   which screens concentrate incoming (hubs) or outgoing (connectors)
//!   navigation?
//! - **Tallies** (`tallies`): how are triggers, actions, transitions and
//!   overlays distributed across every recorded interaction?
//!
//! Navigation works on the [`FlowGraph`](crate::graph::build::FlowGraph)
//! and only sees traversable connections; tallies read the raw connection
//! list so terminal actions are counted too.

pub mod navigation;
pub mod tallies;
