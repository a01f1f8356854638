//! School E-Learning - 学校在线学习平台后端服务
//!
//! 基于 Actix Web 构建，核心是身份与访问控制、作业提交与完成情况统计。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证、角色与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（身份、登录、提交、完成情况）
//! - `storage`: 数据存储层（SeaORM）与作业文件存储
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
