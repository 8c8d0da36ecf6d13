//! EduPortal - 学校门户后端服务
//!
//! 基于 Actix Web 构建，数据、身份、文件与实时消息均由托管后端提供。
//!
//! # 架构
//! - `baas`: 托管后端接入（Supabase / 内存）
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `middlewares`: 会话与角色中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `utils`: 工具函数

pub mod baas;
pub mod config;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod utils;
