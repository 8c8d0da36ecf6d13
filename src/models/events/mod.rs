pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{CalendarEvent, EventCategory, NewEvent};
pub use requests::{CalendarQuery, CreateEventRequest};
pub use responses::{CalendarDay, CalendarMonthResponse, CategoryOption, SubjectsResponse};
