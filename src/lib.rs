//! # Xu (序)
//!
//! 纯 Rust 实现的视频编码图像重排与 GOP 结构规划库.
//!
//! 图像按显示顺序送入, 按满足层级参考依赖的编码顺序取出,
//! 同时把显示时间戳重排为有界重排延迟下的解码时间戳.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use xu::core::Picture;
//! use xu::gop::{PictureQueue, QueueConfig};
//!
//! let mut queue: PictureQueue = PictureQueue::new(QueueConfig::default()).unwrap();
//! queue.accept(Picture::new(0, 1920, 1080), None).unwrap();
//! queue.end_of_input();
//! queue.preanalyse();
//! while let Some(docket) = queue.pull() {
//!     println!("poc={} {}", docket.descriptor.poc, docket.descriptor.nal_class);
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `xu-core` | 错误类型与原始图像 |
//! | `xu-gop` | GOP 结构规划与编码顺序调度 |

/// 核心类型
pub use xu_core as core;

/// GOP 结构规划与编码顺序调度
pub use xu_gop as gop;

/// 获取 Xu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
