//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → handlers.rs / admin (extract, call GatewayService)
//!     → error.rs (GatewayError → status + {"detail"} body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod server;

pub use handlers::StatusResponse;
pub use server::{build_router, AppState, HttpServer};
