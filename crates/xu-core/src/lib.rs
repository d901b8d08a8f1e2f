//! # xu-core
//!
//! Xu 图像重排框架核心库, 提供错误类型与原始图像定义.
//!
//! 调度核心 (`xu-gop`) 与命令行驱动共用本 crate 中的类型.

pub mod error;
pub mod picture;

// 重导出常用类型
pub use error::{XuError, XuResult};
pub use picture::Picture;
