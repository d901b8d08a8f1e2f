//! 输入缓冲.
//!
//! 按显示顺序接收图像及其自适应量化注释, 等待预分析阶段批量取走.

use std::collections::VecDeque;

use log::debug;
use xu_core::{Picture, XuError, XuResult};

/// 输入缓冲中的一项
#[derive(Debug)]
pub struct IntakeItem<A> {
    pub picture: Picture,
    pub aq_info: Option<A>,
}

/// 输入缓冲
#[derive(Debug)]
pub struct IntakeBuffer<A> {
    items: VecDeque<IntakeItem<A>>,
    /// 输入结束标志, 只会从 false 变为 true
    finishing: bool,
}

impl<A> Default for IntakeBuffer<A> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            finishing: false,
        }
    }
}

impl<A> IntakeBuffer<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收一幅图像
    ///
    /// 输入结束后再调用属于调用方的编程错误, 返回 `XuError::InputClosed`.
    pub fn accept(&mut self, picture: Picture, aq_info: Option<A>) -> XuResult<()> {
        if self.finishing {
            return Err(XuError::InputClosed);
        }
        self.items.push_back(IntakeItem { picture, aq_info });
        Ok(())
    }

    /// 标记输入结束, 重复调用无额外效果
    pub fn signal_end_of_input(&mut self) {
        if !self.finishing {
            debug!("输入结束, 剩余 {} 幅图像待预分析", self.items.len());
        }
        self.finishing = true;
    }

    pub fn is_finishing(&self) -> bool {
        self.finishing
    }

    /// 从队首取出至多 `n` 项
    pub fn take_front(&mut self, n: usize) -> Vec<IntakeItem<A>> {
        let n = n.min(self.items.len());
        self.items.drain(..n).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
