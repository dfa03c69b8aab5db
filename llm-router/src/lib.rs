//! Quality-tier LLM router
//!
//! Sends a prompt to a fast or a high-quality backend depending on the
//! requested tier, bounding each call with a deadline and falling back from
//! the fast backend to the high-quality one on the `free` tier.

pub mod config;
pub mod error;
pub mod outcome;
pub mod plan;
pub mod request;
pub mod router;
pub mod server;
pub mod ui;

pub use config::{RouterConfig, RoutingConfig, ServerConfig};
pub use error::{BackendError, BackendErrorKind, RouteError, ValidationError};
pub use outcome::{Fallback, RoutingOutcome};
pub use plan::{BackendPlan, BackendRole};
pub use request::{QualityTier, RouteRequestBody, RoutingRequest};
pub use router::{Backend, PromptRouter};
