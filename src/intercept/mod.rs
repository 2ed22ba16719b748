//! Attaching instrumentation to a running research agent.
//!
//! The host depends on capability traits; wiring replaces its handles with
//! decorators that call through and then report to the integration.

pub mod agent;
pub mod binding;
pub mod capability;
pub mod decorators;

pub use agent::{integrate_research_agent, AttachReport, HostAgent};
pub use binding::{BindingInfo, BindingTable};
pub use capability::{FeedbackCollector, MemoryManager, ResearchFinding, ResearchLoop, ResearchState, ToolExecutor, ToolInvocation};
