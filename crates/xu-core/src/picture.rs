//! 原始图像 (Picture).
//!
//! 编码器输入端的一帧未压缩图像. 平面数据使用引用计数的 `Bytes`,
//! 生产者可以保留廉价的句柄, 而图像值本身随调度结果一起移交给编码流程.

use bytes::Bytes;

/// 原始图像
#[derive(Debug, Clone)]
pub struct Picture {
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 采样位深 (8 或 10 等)
    pub bit_depth: u8,
    /// 各平面的采样数据
    pub planes: Vec<Bytes>,
}

impl Picture {
    /// 创建不带采样数据的图像
    pub fn new(pts: i64, width: u32, height: u32) -> Self {
        Self {
            pts,
            width,
            height,
            bit_depth: 8,
            planes: Vec::new(),
        }
    }

    /// 附加一个采样平面
    pub fn with_plane(mut self, plane: impl Into<Bytes>) -> Self {
        self.planes.push(plane.into());
        self
    }

    /// 第 0 平面的首个采样值, 平面为空时返回 `None`
    pub fn first_sample(&self) -> Option<u8> {
        self.planes.first().and_then(|p| p.first().copied())
    }
}
