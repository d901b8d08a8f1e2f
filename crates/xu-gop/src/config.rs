//! 调度队列配置.
//!
//! 配置由调用方解析后传入, 构造队列时只做合法性校验.

use serde::{Deserialize, Serialize};
use xu_core::{XuError, XuResult};

/// 调度队列配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// 帧内刷新周期 (max-gop-n)
    pub intra_period: u32,
    /// 基础 GOP 大小 (max-gop-m), 只能为 1 或 8
    pub gop_size: u32,
    /// 场编码
    pub field_coding: bool,
    /// 按场景切换位置放置帧内刷新
    pub scene_cut: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            intra_period: 64,
            gop_size: 8,
            field_coding: false,
            scene_cut: false,
        }
    }
}

impl QueueConfig {
    /// 校验配置
    pub fn validate(&self) -> XuResult<()> {
        if self.gop_size != 1 && self.gop_size != 8 {
            return Err(XuError::InvalidConfig(format!(
                "max-gop-m 必须为 1 或 8, 实际为 {}",
                self.gop_size
            )));
        }
        if self.intra_period == 0 {
            return Err(XuError::InvalidConfig("max-gop-n 不能为 0".into()));
        }
        Ok(())
    }
}
