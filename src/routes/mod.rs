pub mod auth;

pub mod dashboard;

pub mod materials;

pub mod events;

pub mod chat;

pub mod students;

pub mod shell;

pub use auth::configure_auth_routes;
pub use chat::configure_chat_routes;
pub use dashboard::configure_dashboard_routes;
pub use events::configure_event_routes;
pub use materials::configure_material_routes;
pub use shell::configure_shell_routes;
pub use students::configure_student_routes;

