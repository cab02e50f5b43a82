//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`cart`] - 购物车接口

pub mod cart;
pub mod health;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
