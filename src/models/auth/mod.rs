pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{AuthSession, AuthUser, UserMetadata};
pub use requests::{LoginRequest, RefreshRequest};
pub use responses::LoginResponse;
