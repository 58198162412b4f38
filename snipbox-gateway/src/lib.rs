//! HTTP front end for the snipbox snippet execution service.
//!
//! Serves a single endpoint: `GET /` returns the editor page, `POST /`
//! checks the request shape, rate limits by origin, screens the code
//! against the denylist, and runs it. `GET /health` reports load counters.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod origin;
pub mod routes;
pub mod state;

pub use config::{Cli, ConfigError, GatewayConfig, Mode};
pub use error::GatewayError;
pub use routes::create_router;
pub use state::AppState;
