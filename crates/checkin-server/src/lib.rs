//! # checkin-server
//!
//! Live registry of streaming connections plus a single shared check-in
//! record that connected peers update and HTTP clients poll.
//!
//! - `GET /ws`: streaming connection, one session task per connection
//! - `GET /clients`, `GET /check-ins`: read-only snapshots
//! - `GET /`: static landing page

#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod query;
pub mod registry;
pub mod server;
pub mod session;
pub mod store;

pub use config::ServerConfig;
pub use error::ServerError;
pub use query::QuerySurface;
pub use registry::ConnectionRegistry;
pub use server::{build_router, start, AppState, ServerHandle};
pub use session::{SessionContext, SessionEnd};
pub use store::CheckInStore;
