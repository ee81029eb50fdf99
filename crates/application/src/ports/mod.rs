//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the login flow and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod approver;
mod cancellation;
mod transport;

pub use approver::{ApprovalRequest, Approver};
pub use cancellation::{CancellationReceiver, CancellationToken};
pub use transport::{Parameters, Transport, TransportError};
