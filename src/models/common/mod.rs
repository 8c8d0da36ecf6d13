pub mod error_code;
pub mod id;
pub mod response;

pub use error_code::ErrorCode;
pub use id::deserialize_id;
pub use response::ApiResponse;
