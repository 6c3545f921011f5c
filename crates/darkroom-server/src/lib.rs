//! Darkroom server: the HTTP and WebSocket surface over `darkroom-core`.
//!
//! - [`registry`]: live connections and their outbound queues
//! - [`session`]: the per-connection editing state machine
//! - [`ws`]: socket plumbing that drives a session
//! - [`http`]: stateless one-shot endpoints

pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod ws;

pub use config::{Args, ServerConfig};
pub use error::{ApiError, ChannelError, ConfigError};
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::{ConnectionId, SessionRegistry};
pub use server::{build_router, start, AppState, ServerHandle};
pub use session::{EditingSession, SessionState};
