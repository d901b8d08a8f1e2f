//! 编码描述 (Descriptor) 与已释放的编码单 (Docket).
//!
//! 规划器为窗口中每幅图像生成一个 `Descriptor`; 调度器释放图像时,
//! 把描述、图像本体、附带注释与解码时间戳打包成 `Docket` 交给编码流程.

use std::collections::BTreeSet;

use xu_core::Picture;

use crate::nal::NalClass;
use crate::preanalysis::LookaheadAnalysis;

/// 条带类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceType {
    /// 双向预测条带
    B,
    /// 帧内条带
    I,
}

/// 参考关系
///
/// 偏移以窗口位置计. 负偏移指向已编码的更早图像;
/// 正偏移指向显示顺序更晚、但必须先于本图像释放的图像.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// 负偏移集合
    pub negative: BTreeSet<i32>,
    /// 正偏移集合
    pub positive: BTreeSet<i32>,
}

impl References {
    /// 按符号插入偏移, 0 被忽略
    pub fn insert(&mut self, delta: i32) {
        if delta < 0 {
            self.negative.insert(delta);
        } else if delta > 0 {
            self.positive.insert(delta);
        }
    }

    /// 是否没有任何参考
    pub fn is_empty(&self) -> bool {
        self.negative.is_empty() && self.positive.is_empty()
    }
}

/// 单幅图像的编码描述
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    /// 图像顺序号 (从码流起点计的显示位置)
    pub poc: i64,
    /// NAL 类别
    pub nal_class: NalClass,
    /// QP 偏移
    pub qp_offset: i32,
    /// QP 缩放因子
    pub qp_factor: f64,
    /// 做出决定时生效的 GOP 大小
    pub gop_size: usize,
    /// 条带类型
    pub slice_type: SliceType,
    /// 参考关系
    pub references: References,
}

impl Descriptor {
    /// 创建描述, 条带类型由 NAL 类别推出
    pub fn new(
        poc: i64,
        nal_class: NalClass,
        qp_offset: i32,
        qp_factor: f64,
        gop_size: usize,
    ) -> Self {
        Self {
            poc,
            nal_class,
            qp_offset,
            qp_factor,
            gop_size,
            slice_type: if nal_class.is_irap() {
                SliceType::I
            } else {
                SliceType::B
            },
            references: References::default(),
        }
    }

    /// 是否为帧内描述
    pub fn is_intra(&self) -> bool {
        self.slice_type == SliceType::I
    }
}

/// 已释放给编码流程的编码单
#[derive(Debug)]
pub struct Docket<A = ()> {
    /// 编码描述
    pub descriptor: Descriptor,
    /// 待编码图像 (所有权已转移给调用方)
    pub picture: Picture,
    /// 自适应量化注释, 原样透传
    pub aq_info: Option<A>,
    /// 预分析结果
    pub analysis: LookaheadAnalysis,
    /// 解码时间戳 (DTS)
    pub dts: i64,
}
