//! Talking to the board API: session tokens and the HTTP gateway.

pub mod client;
pub mod session;

pub use client::{ApiClient, ApiError, ApiResult, UploadResponse, UploadedFile};
pub use session::{Claims, ExpiryState, Session, SessionError};
