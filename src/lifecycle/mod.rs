//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Registry client → Gateway service → Listener
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT or Shutdown::trigger → Stop accepting → Drain requests → Exit
//! ```

pub mod signals;
pub mod startup;

pub use signals::Shutdown;
