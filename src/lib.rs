//! Zerolight Portal Gateway Library

// Core subsystems
pub mod admin;
pub mod config;
pub mod gateway;
pub mod http;
pub mod registry;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use gateway::GatewayService;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
