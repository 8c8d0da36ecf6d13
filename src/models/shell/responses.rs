use serde::Serialize;

// 导航项
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
}

// 外壳状态
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShellState {
    pub active_view: String,
    pub has_unread_messages: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShellResponse {
    pub shell_id: String,
    pub role_label: &'static str,
    pub navigation: Vec<NavItem>,
    pub state: ShellState,
}
