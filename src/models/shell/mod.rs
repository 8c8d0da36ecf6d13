pub mod requests;
pub mod responses;

pub use requests::{NavigateRequest, OpenShellRequest};
pub use responses::{NavItem, OpenShellResponse, ShellState};
