//! Action schema registry, typed operations, and the response extractor.
//!
//! The registry is the single declaration of what may run. Both entry points
//! read it: the local prompt renders it as a tool catalogue and the MCP server
//! renders it as JSON-Schema tool definitions.

mod extract;
mod registry;
mod types;

pub use extract::{Extraction, Proposal, extract, normalize};
pub use registry::{ArgSpec, FamilySchema, OperationSchema, lookup, registry, validate};
pub use types::{
    Action, ClusterOp, Component, CompositorOp, Family, NetworkOp, Operation, ServiceOp,
    StatusBarOp,
};
