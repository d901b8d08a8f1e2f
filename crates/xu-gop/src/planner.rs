//! GOP 结构规划器.
//!
//! 每次调度拉取时推进一次: 决定下一个帧内刷新点, 选定本组的实际 GOP 大小,
//! 然后为组尾与组内各位置生成编码描述. 窗口数据不足以决定一整组时不做任何事.

use log::{debug, trace};
use xu_core::XuResult;

use crate::config::QueueConfig;
use crate::descriptor::Descriptor;
use crate::nal::NalClass;
use crate::pattern::{Role, TAIL_QP_FACTOR, pattern};
use crate::window::{SequenceState, Window};

/// 组尾的决定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupEnd {
    /// 以参考尾随图像结束
    Trailing,
    /// 输入结束, 剩余图像不足一组
    Truncated,
    /// 以帧内刷新图像结束
    Intra,
}

/// GOP 结构规划器
#[derive(Debug)]
pub struct GopPlanner {
    base_gop_size: usize,
    intra_period: i64,
    field_coding: bool,
    scene_cut: bool,
    /// 按绝对图像位置索引的场景切换标志
    scene_cuts: Vec<bool>,
    /// 被丢弃的正向参考计数
    dropped_references: usize,
}

impl GopPlanner {
    pub fn new(config: &QueueConfig) -> XuResult<Self> {
        config.validate()?;
        Ok(Self {
            base_gop_size: config.gop_size as usize,
            intra_period: i64::from(config.intra_period),
            field_coding: config.field_coding,
            scene_cut: config.scene_cut,
            scene_cuts: Vec::new(),
            dropped_references: 0,
        })
    }

    /// 更新场景切换标志, 空列表保留原有标志
    pub fn set_scene_cuts(&mut self, cuts: Vec<bool>) {
        if !cuts.is_empty() {
            self.scene_cuts = cuts;
        }
    }

    pub fn base_gop_size(&self) -> usize {
        self.base_gop_size
    }

    /// 因目标不可用而被丢弃的正向参考数
    pub fn dropped_references(&self) -> usize {
        self.dropped_references
    }

    /// 在 `[front, periodic)` 内寻找第一个场景切换位置, 找不到时返回 `periodic`
    ///
    /// 场编码时标志按帧索引 (位置右移一位), 且只考虑偶数位置.
    fn scan_scene_cuts(&self, front: i64, periodic: i64) -> i64 {
        let shift = u32::from(self.field_coding);
        let stride = 1 + i64::from(self.field_coding);
        for poc in front..periodic {
            let index = (poc >> shift).max(0) as usize;
            let Some(&cut) = self.scene_cuts.get(index) else {
                break;
            };
            if poc % stride == 0 && cut {
                return poc;
            }
        }
        periodic
    }

    /// 规划一组图像, 返回本次写入的描述数
    pub fn plan<A>(
        &mut self,
        state: &mut SequenceState,
        window: &mut Window<A>,
        finishing: bool,
    ) -> usize {
        if window.is_empty() || window.front_is_planned() {
            return 0;
        }

        if state.next_intra < state.front {
            let periodic = state.next_intra + self.intra_period;
            state.next_intra = if self.scene_cut {
                self.scan_scene_cuts(state.front, periodic)
            } else {
                periodic
            };
            debug!(
                "下一帧内刷新点: poc={} (基线 {})",
                state.next_intra, state.front
            );
        }

        let available = window.len();
        let mut size = self.base_gop_size;
        let mut end = GroupEnd::Trailing;

        if finishing && available < size {
            size = available;
            end = GroupEnd::Truncated;
        }

        let intra_distance = state.intra_distance().max(1) as usize;
        if intra_distance <= size {
            size = intra_distance;
            end = GroupEnd::Intra;
        }

        if available < size {
            return 0;
        }

        let intra_group = end == GroupEnd::Intra;
        let (tail_class, tail_qp) = if intra_group {
            let class = if state.front == 0 {
                NalClass::IdrNLp
            } else {
                NalClass::Cra
            };
            (class, 0)
        } else {
            (NalClass::TrailR, 1)
        };
        self.commit(
            state,
            window,
            size,
            size,
            tail_class,
            tail_qp,
            TAIL_QP_FACTOR,
            &[-(size as i32)],
        );

        if let Some(table) = pattern(size) {
            for entry in table {
                let class = match (entry.role, intra_group) {
                    (Role::Reference, false) => NalClass::TrailR,
                    (Role::NonReference, false) => NalClass::TrailN,
                    (Role::Reference, true) => NalClass::RaslR,
                    (Role::NonReference, true) => NalClass::RaslN,
                };
                self.commit(
                    state,
                    window,
                    size,
                    entry.position,
                    class,
                    entry.qp_offset,
                    entry.qp_factor,
                    entry.deltas,
                );
            }
        }

        debug!(
            "规划 GOP: 起点 poc={}, 大小={}, 组尾={:?}",
            state.front, size, end
        );
        size
    }

    /// 为组内位置 `position` (从 1 开始) 生成描述并写入窗口
    #[allow(clippy::too_many_arguments)]
    fn commit<A>(
        &mut self,
        state: &SequenceState,
        window: &mut Window<A>,
        size: usize,
        position: usize,
        nal_class: NalClass,
        qp_offset: i32,
        qp_factor: f64,
        deltas: &[i32],
    ) {
        let index = position - 1;
        let mut descriptor = Descriptor::new(
            state.front + index as i64,
            nal_class,
            qp_offset,
            qp_factor,
            size,
        );
        for &delta in deltas {
            if Self::accepts_reference(state, window, index, delta) {
                descriptor.references.insert(delta);
            } else {
                self.dropped_references += 1;
                trace!(
                    "丢弃参考: poc={}, delta={}",
                    descriptor.poc, delta
                );
            }
        }
        window.assign(index, descriptor);
    }

    /// 参考偏移是否可用
    ///
    /// 负偏移总是可用; 正偏移的目标必须落在可决定的范围内 (窗口长度与
    /// 帧内刷新点二者取小) 且已有描述.
    fn accepts_reference<A>(
        state: &SequenceState,
        window: &Window<A>,
        index: usize,
        delta: i32,
    ) -> bool {
        if delta < 0 {
            return true;
        }
        if delta == 0 {
            return false;
        }
        let limit = window
            .len()
            .min(state.intra_distance().max(0) as usize);
        let target = index + delta as usize;
        target < limit && window.is_planned(target)
    }
}
