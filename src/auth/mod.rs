//! Authentication: token codec, orchestrator, and HTTP handlers.

mod handlers;
mod jwt;
mod service;

pub use handlers::{login, logout, me, refresh, register};
pub use jwt::{Algorithm, Claims, InvalidToken, TokenCodec};
pub use service::AuthService;
