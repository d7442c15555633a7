pub mod analyze;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod routes;
pub mod ws;

pub use routes::create_router;
pub use ws::{StreamKind, StreamMessage, WsBroadcaster};
