//! # xu-gop
//!
//! 视频编码器输入端的图像重排与 GOP 结构规划.
//!
//! 图像按显示顺序送入, 经预分析后进入调度窗口, 由规划器为每幅图像生成
//! 编码描述 (参考关系、NAL 类型、QP 偏移), 再由调度器按依赖关系逐幅释放,
//! 同时把显示时间戳重排为解码时间戳.
//!
//! ## 使用示例
//!
//! ```rust
//! use xu_core::Picture;
//! use xu_gop::{PictureQueue, QueueConfig};
//!
//! let mut queue: PictureQueue = PictureQueue::new(QueueConfig::default()).unwrap();
//! for pts in 0..9 {
//!     queue.accept(Picture::new(pts, 64, 64), None).unwrap();
//! }
//! queue.end_of_input();
//! queue.preanalyse();
//!
//! let mut order = Vec::new();
//! while let Some(docket) = queue.pull() {
//!     order.push(docket.descriptor.poc);
//! }
//! assert_eq!(order.len(), 9);
//! ```

pub mod config;
pub mod descriptor;
pub mod intake;
pub mod nal;
pub mod pattern;
pub mod planner;
pub mod preanalysis;
pub mod queue;
pub mod timestamps;
pub mod window;

// 重导出常用类型
pub use config::QueueConfig;
pub use descriptor::{Descriptor, Docket, References, SliceType};
pub use nal::NalClass;
pub use preanalysis::{LookaheadAnalysis, NullPreanalyser, Preanalyser};
pub use queue::PictureQueue;
pub use timestamps::{REORDER_DELAY, ReorderQueue};
