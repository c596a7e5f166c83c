pub mod agents;
pub mod context;
pub mod outlet;
pub mod workflow;
