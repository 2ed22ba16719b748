pub mod client;
pub mod memory;

pub use client::{IngestionClient, PlanResult, PlanStep, RetrievalResult, RetrievedItem};
pub use memory::{ContextEvent, InMemoryGraphClient};
