//! Circuit services and the selection store backing the dropdown.
//!
//! - [`ServiceRecord`] / [`ServiceCollection`] - the seeded, ordered service list
//! - [`ServiceAction`] - the closed set of actions the store understands
//! - [`ServiceStore`] - shared handle that holds the current collection and applies actions

mod action;
mod record;
mod store;

pub use action::{ActionError, ServiceAction};
pub use record::{ServiceCollection, ServiceRecord};
pub use store::{DispatchOutcome, ServiceStore};
