pub mod clock;
pub mod extractor;
pub mod file_magic;
pub mod parameter_error_handler;
pub mod validate;

pub use clock::{PortalClock, default_slot};
pub use extractor::{SafeRecordId, SafeShellId};
pub use file_magic::content_matches_kind;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
