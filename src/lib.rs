//! Vito: hands out tasks to crews each period and keeps the books.
//!
//! A [`Broker`] holds the people, crews and tasks of a run. For a given
//! date it assigns every pending task to the first crew able and willing to
//! take it, then carries the tasks out, moving money between the task's
//! target, the crew and the broker, and notifying observers.

pub mod broker;
pub mod config;
pub mod model;
pub mod notify;
pub mod scenario;

pub use broker::{Broker, BrokerError, PeriodReport};
pub use config::Config;
pub use scenario::Scenario;
