//! Approvers backed by the remote service.

mod login_approver;

pub use login_approver::LoginApprover;
