//! Worker Lambda handler and batch processing

pub mod batch;
pub mod handler;

// Re-export the main handler for convenience
pub use handler::handler;
