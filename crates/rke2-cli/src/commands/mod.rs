//! Command implementations for the provider binary

pub mod event;
pub mod merge;
pub mod plan;

pub use event::run_event;
pub use merge::run_merge;
pub use plan::run_plan;
