use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenShellRequest {
    // 打开时所在的视图，默认 "/"
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigateRequest {
    pub path: String,
}
