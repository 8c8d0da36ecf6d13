use serde::{Deserialize, Serialize};

use crate::models::common::deserialize_id;

// 学生名册记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Student {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub class: String,
}

// 写入存储的字段
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentPayload {
    pub name: String,
    pub email: String,
    pub class: String,
}
