//! Webhook transport: an axum server that feeds Telegram updates to the
//! same dispatcher the polling loop uses.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use router::{AppState, create_router};
pub use server::run_server;
