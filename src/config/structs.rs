use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub baas: BaasConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub portal: PortalConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "EduPortal".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 5000,
            client_disconnect: 1000,
            keep_alive: 30,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1024 * 1024,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { max_age: 3600 }
    }
}

/// 托管后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaasConfig {
    // 后端类型：supabase 或 memory
    pub provider: String,
    pub url: String,
    #[serde(skip_serializing)] // 不序列化到JSON响应中
    pub anon_key: String,
    pub materials_bucket: String,
    pub request_timeout_secs: u64,
    pub realtime_heartbeat_secs: u64,
}

impl Default for BaasConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            url: String::new(),
            anon_key: String::new(),
            materials_bucket: "materials".to_string(),
            request_timeout_secs: 15,
            realtime_heartbeat_secs: 30,
        }
    }
}

/// 会话缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cache_ttl_secs: u64,
    pub max_sessions: u64,
    // 外壳闲置超过该时长即被回收
    pub shell_idle_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            max_sessions: 10_000,
            shell_idle_secs: 1800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_size: usize, // 单文件最大字节数
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size: 20 * 1024 * 1024,
        }
    }
}

/// 门户业务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    // 本地时区相对 UTC 的偏移（分钟）
    pub utc_offset_minutes: i32,
    pub subjects: Vec<String>,
    // 邮箱包含这些子串时视为教师（区分大小写）
    pub teacher_markers: Vec<String>,
    // 明确指定为教师的邮箱
    pub teacher_emails: Vec<String>,
    pub default_student_class: String,
    pub chat_history_limit: usize,
    pub upcoming_limit: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            subjects: [
                "Mathematics",
                "Physics",
                "History",
                "Literature",
                "Computer Science",
                "Chemistry",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            teacher_markers: ["admin", "prof", "teacher"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            teacher_emails: Vec::new(),
            default_student_class: "New Enrollment".to_string(),
            chat_history_limit: 100,
            upcoming_limit: 5,
        }
    }
}
