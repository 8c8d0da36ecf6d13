use serde::{Deserialize, Serialize};

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Teacher, // 教师
    Student, // 学生
}

impl UserRole {
    pub const TEACHER: &'static str = "TEACHER";
    pub const STUDENT: &'static str = "STUDENT";

    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher]
    }

    /// 界面上显示的角色名称
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Teacher => "Teacher",
            UserRole::Student => "Student",
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "invalid user role: '{s}'. supported roles: TEACHER, STUDENT"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    // 元数据里的角色声明大小写不一，这里统一忽略大小写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(UserRole::TEACHER) {
            Ok(UserRole::Teacher)
        } else if s.eq_ignore_ascii_case(UserRole::STUDENT) {
            Ok(UserRole::Student)
        } else {
            Err(format!("Invalid user role: {s}"))
        }
    }
}

// 门户用户（由托管身份服务的用户映射而来）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortalUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<String>,
}

impl PortalUser {
    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }

    /// 名字的第一个词，用于问候语
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }
}
