//! Seven console - drives the dispatch pipeline from a terminal.
//!
//! Exposes the listen gate, executors and console loop for tests.

pub mod console;
pub mod executor;
pub mod gate;
pub mod logging;

pub use console::{Console, Control};
pub use executor::{DryRunExecutor, Executor};
pub use gate::{GateEvent, ListenGate};
