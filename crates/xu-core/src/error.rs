//! 统一错误类型定义.
//!
//! 调度核心只有两类真正的失败: 配置非法与调用方违反前置条件.
//! "数据不足" 之类的软结果以 `None` 表达, 不走错误通道.

use thiserror::Error;

/// Xu 框架统一错误类型
#[derive(Debug, Error)]
pub enum XuError {
    /// 配置非法 (致命, 不可重试)
    #[error("配置非法: {0}")]
    InvalidConfig(String),

    /// 输入已结束后仍送入图像
    #[error("输入已结束, 不再接受新图像")]
    InputClosed,
}

/// Xu 框架统一 Result 类型
pub type XuResult<T> = Result<T, XuError>;
