//! 调度窗口.
//!
//! 窗口中的条目按显示顺序排列, 以 "相对基线的位置" 寻址: 下标 0 永远是
//! 基线 `SequenceState::front` 对应的图像. 队首条目释放后被弹出,
//! 基线随之前移, 所有偏移量都是相对的, 因而无需重新编号.

use std::collections::VecDeque;

use xu_core::Picture;

use crate::descriptor::Descriptor;
use crate::preanalysis::LookaheadAnalysis;

/// 规划器与调度器共享的序列计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceState {
    /// 窗口队首图像的 POC
    pub front: i64,
    /// 下一个计划的帧内刷新 POC
    pub next_intra: i64,
}

impl SequenceState {
    /// 到下一帧内刷新点为止 (含) 的图像数
    pub fn intra_distance(&self) -> i64 {
        self.next_intra - self.front + 1
    }
}

/// 窗口条目
#[derive(Debug)]
pub struct WindowEntry<A> {
    /// 图像本体, 释放后为 `None`
    picture: Option<Picture>,
    aq_info: Option<A>,
    analysis: LookaheadAnalysis,
    descriptor: Option<Descriptor>,
}

impl<A> WindowEntry<A> {
    /// 是否已释放给编码流程
    pub fn is_released(&self) -> bool {
        self.picture.is_none()
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    pub fn is_planned(&self) -> bool {
        self.descriptor.is_some()
    }

    pub fn analysis(&self) -> &LookaheadAnalysis {
        &self.analysis
    }
}

/// 已从窗口取出的图像及其附带信息
#[derive(Debug)]
pub struct Released<A> {
    pub descriptor: Descriptor,
    pub picture: Picture,
    pub aq_info: Option<A>,
    pub analysis: LookaheadAnalysis,
}

/// 调度窗口
#[derive(Debug)]
pub struct Window<A> {
    entries: VecDeque<WindowEntry<A>>,
}

impl<A> Default for Window<A> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<A> Window<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在队尾追加一幅已预分析的图像
    pub fn push(&mut self, picture: Picture, aq_info: Option<A>, analysis: LookaheadAnalysis) {
        self.entries.push_back(WindowEntry {
            picture: Some(picture),
            aq_info,
            analysis,
            descriptor: None,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WindowEntry<A>> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowEntry<A>> {
        self.entries.iter()
    }

    /// 队首条目是否已有描述
    pub fn front_is_planned(&self) -> bool {
        self.entries.front().is_some_and(WindowEntry::is_planned)
    }

    /// 指定位置是否已有描述
    pub fn is_planned(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(WindowEntry::is_planned)
    }

    /// 指定位置是否已释放
    ///
    /// 超出队尾的位置尚未到达, 视为未释放.
    pub fn is_released(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(WindowEntry::is_released)
    }

    /// 为指定位置写入描述, 位置不存在时返回 false
    pub fn assign(&mut self, index: usize, descriptor: Descriptor) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.descriptor = Some(descriptor);
                true
            }
            None => false,
        }
    }

    /// 取出指定位置的图像, 条目标记为已释放
    ///
    /// 条目没有描述或已释放时返回 `None`.
    pub fn release(&mut self, index: usize) -> Option<Released<A>> {
        let entry = self.entries.get_mut(index)?;
        let descriptor = entry.descriptor.clone()?;
        let picture = entry.picture.take()?;
        Some(Released {
            descriptor,
            picture,
            aq_info: entry.aq_info.take(),
            analysis: std::mem::take(&mut entry.analysis),
        })
    }

    /// 弹出队首所有已释放的条目, 每弹出一个基线前移一位
    pub fn retire(&mut self, state: &mut SequenceState) -> usize {
        let mut retired = 0;
        while self.entries.front().is_some_and(WindowEntry::is_released) {
            self.entries.pop_front();
            state.front += 1;
            retired += 1;
        }
        retired
    }
}
