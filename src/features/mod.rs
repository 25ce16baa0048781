pub mod enrich;
pub mod generate;
pub mod workflow;

pub use enrich::{Enricher, EnrichmentCollector, StagingArea};
pub use generate::{REJECTION_SENTINEL, ResponseGenerator};
pub use workflow::{ReplyWorkflow, WorkflowState};
