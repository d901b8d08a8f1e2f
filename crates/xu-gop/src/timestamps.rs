//! 时间戳重排队列.
//!
//! 编码器持有固定的重排延迟 `REORDER_DELAY`. 第一幅图像的时间戳要等到
//! 之后再看到若干幅图像才能分配出去, 因此在收到第二幅图像时,
//! 按前两幅图像的间隔向前外推补入 `REORDER_DELAY` 个虚拟时间戳,
//! 使解码时间戳始终早于或等于对应的显示时间戳.

use std::collections::VecDeque;

/// 重排延迟 (图像数)
pub const REORDER_DELAY: usize = 3;

/// 时间戳槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampSlot {
    /// 序号 (虚拟槽位为 0..REORDER_DELAY, 真实图像从 REORDER_DELAY 起)
    pub sequence: usize,
    /// 时间戳
    pub timestamp: i64,
}

/// 时间戳重排队列
#[derive(Debug, Default)]
pub struct ReorderQueue {
    slots: VecDeque<TimestampSlot>,
    recorded: usize,
}

impl ReorderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录刚进入队列的图像的显示时间戳
    pub fn record(&mut self, pts: i64) {
        if self.recorded == 1 {
            if let Some(first) = self.slots.front().map(|s| s.timestamp) {
                let period = pts - first;
                for i in 0..REORDER_DELAY {
                    let earliest = self.slots.front().map_or(first, |s| s.timestamp);
                    self.slots.push_front(TimestampSlot {
                        sequence: i,
                        timestamp: earliest - period,
                    });
                }
            }
        }
        self.slots.push_back(TimestampSlot {
            sequence: self.recorded + REORDER_DELAY,
            timestamp: pts,
        });
        self.recorded += 1;
    }

    /// 取出最早的时间戳作为下一幅释放图像的解码时间戳
    pub fn next(&mut self) -> Option<i64> {
        self.slots.pop_front().map(|s| s.timestamp)
    }

    /// 查看队首槽位
    pub fn peek(&self) -> Option<&TimestampSlot> {
        self.slots.front()
    }

    /// 已记录的真实图像数
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// 剩余槽位数
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
