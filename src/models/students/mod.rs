pub mod entities;
pub mod requests;

pub use entities::{Student, StudentPayload};
pub use requests::{SaveStudentRequest, StudentListQuery};
