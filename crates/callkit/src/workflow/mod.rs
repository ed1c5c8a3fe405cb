//! # Workflow Service
//!
//! Domain management operations of a workflow service, declared on top of the
//! binding tables and clients of this crate. Requests show every binding
//! location: path labels, query parameters, headers, payload fields, nested
//! structures and lists.

mod client;
mod model;

pub use client::WorkflowAsyncClient;
pub use client::WorkflowClient;
pub use model::*;

use crate::client::Operation;

/// Service name used as the target prefix.
pub const SERVICE: &str = "WorkflowService";

pub static REGISTER_DOMAIN: Operation = Operation::new("RegisterDomain", http::Method::POST, "/domains");
pub static DEPRECATE_DOMAIN: Operation = Operation::new("DeprecateDomain", http::Method::POST, "/domains/{name}/deprecate");
pub static DESCRIBE_DOMAIN: Operation = Operation::new("DescribeDomain", http::Method::GET, "/domains/{name}");
pub static LIST_DOMAINS: Operation = Operation::new("ListDomains", http::Method::GET, "/domains");
pub static COUNT_PENDING_ACTIVITY_TASKS: Operation =
    Operation::new("CountPendingActivityTasks", http::Method::POST, "/domains/{domain}/pending-activity-tasks");
