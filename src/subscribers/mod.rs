//! # Event subscribers.
//!
//! The [`Subscribe`] trait plus the built-in consumers of the
//! [`Bus`](crate::events::Bus):
//!
//! - [`SubscriberSet`] — per-subscriber bounded queues with fan-out,
//!   overflow reporting, and panic isolation
//! - [`AliveTracker`] — the live-worker set the watchdog inspects
//! - [`LogWriter`] — the durable lifecycle journal

mod alive;
mod log;
mod set;
mod subscribe;

pub use alive::AliveTracker;
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
