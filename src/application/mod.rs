//! Application layer: status hierarchy resolution, payment method management
//! and the execution pipeline that authorizes, executes and parks payments.
//!
//! Everything here is storage agnostic and talks to the outside world through
//! the ports in [`crate::domain::ports`].

pub mod access_control;
pub mod cache;
pub mod catalog;
pub mod claims;
pub mod executor;
pub mod hierarchy;
pub mod methods;
pub mod queue;
pub mod workflow;
