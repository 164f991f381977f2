//! Runtime core: lifecycle orchestration.
//!
//! - [`controller`]: lifecycle state machine over the fixed worker set;
//! - [`supervisor`]: runs one worker's loop and reports its terminal state;
//! - [`watchdog`]: bounded final wait and the forced-termination verdict;
//! - [`signals`]: maps OS signals to lifecycle requests.

mod controller;
mod signals;
mod supervisor;
mod watchdog;

pub use controller::ServiceController;
pub use signals::{ControlRequest, SignalRouter};
pub use supervisor::WorkerSupervisor;
pub use watchdog::{Disposition, ShutdownWatchdog, EXIT_CLEAN, EXIT_FORCED};
