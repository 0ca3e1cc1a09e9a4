//! WebSocket Gateway
//!
//! Real-time presence and chat delivery over WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod presence;
pub mod rooms;
pub mod session;

/// Identifies one live connection
pub type ConnectionId = uuid::Uuid;

pub use gateway::{Gateway, OutboundFrame};
pub use handler::ws_handler;
pub use messages::{ClientEvent, ServerEvent};
pub use presence::PresenceRegistry;
pub use rooms::RoomRouter;
pub use session::{Session, SessionServices};
