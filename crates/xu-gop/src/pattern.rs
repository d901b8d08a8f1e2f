//! 层级 GOP 结构表.
//!
//! 每个 GOP 大小 (2..=8) 对应一组声明式条目, 描述组内中间位置的
//! 参考角色、QP 偏移、QP 缩放因子与参考偏移. 组的最后一个位置由规划器
//! 单独决定, 不在表中. 条目顺序即应用顺序: 正偏移只会指向组尾或
//! 排在前面的条目, 保证依赖关系无环.
//!
//! 位置从 1 开始计, 1 表示组内第一幅图像.

/// 图像在层级中的参考角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 被后续图像参考
    Reference,
    /// 不被参考
    NonReference,
}

/// 结构表条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternEntry {
    /// 组内位置 (从 1 开始)
    pub position: usize,
    pub role: Role,
    pub qp_offset: i32,
    pub qp_factor: f64,
    /// 参考偏移 (正负皆可)
    pub deltas: &'static [i32],
}

/// 稳态 GOP 大小
pub const STEADY_GOP_SIZE: usize = 8;

/// 组尾图像的 QP 缩放因子
pub const TAIL_QP_FACTOR: f64 = 0.4420;

const QP_FACTOR_MID: f64 = 0.3536;
const QP_FACTOR_LEAF: f64 = 0.6800;

const fn entry(
    position: usize,
    role: Role,
    qp_offset: i32,
    qp_factor: f64,
    deltas: &'static [i32],
) -> PatternEntry {
    PatternEntry {
        position,
        role,
        qp_offset,
        qp_factor,
        deltas,
    }
}

use Role::{NonReference as N, Reference as R};

const GOP_2: &[PatternEntry] = &[entry(1, R, 2, QP_FACTOR_LEAF, &[-1, 1])];

const GOP_3: &[PatternEntry] = &[
    entry(2, R, 2, QP_FACTOR_MID, &[-2, 1]),
    entry(1, N, 3, QP_FACTOR_LEAF, &[-1, 2, 1]),
];

const GOP_4: &[PatternEntry] = &[
    entry(2, R, 2, QP_FACTOR_MID, &[-2, 2]),
    entry(1, N, 3, QP_FACTOR_LEAF, &[-1, 3, 1]),
    entry(3, N, 3, QP_FACTOR_LEAF, &[-1, 1]),
];

const GOP_5: &[PatternEntry] = &[
    entry(3, R, 2, QP_FACTOR_MID, &[-3, 2]),
    entry(1, R, 2, QP_FACTOR_MID, &[-1, 4, 2]),
    entry(2, N, 3, QP_FACTOR_LEAF, &[-2, 3, -1, 1]),
    entry(4, N, 3, QP_FACTOR_LEAF, &[-4, 1, -1]),
];

const GOP_6: &[PatternEntry] = &[
    entry(3, R, 2, QP_FACTOR_MID, &[-3, 3]),
    entry(1, R, 3, QP_FACTOR_MID, &[-1, 5, 2]),
    entry(2, N, 4, QP_FACTOR_LEAF, &[-2, 4, 1, -1]),
    entry(5, R, 3, QP_FACTOR_MID, &[-5, 1, -2]),
    entry(4, N, 4, QP_FACTOR_LEAF, &[-4, 2, -1, 1]),
];

const GOP_7: &[PatternEntry] = &[
    entry(4, R, 2, QP_FACTOR_MID, &[-4, 3]),
    entry(2, R, 3, QP_FACTOR_MID, &[-2, 5, 2]),
    entry(1, N, 4, QP_FACTOR_LEAF, &[-1, 6, 3, 1]),
    entry(3, N, 4, QP_FACTOR_LEAF, &[-3, 4, 1, -1]),
    entry(6, R, 3, QP_FACTOR_MID, &[-2, 1]),
    entry(5, N, 4, QP_FACTOR_LEAF, &[-1, 2, 1]),
];

// 稳态三层金字塔
const GOP_8: &[PatternEntry] = &[
    entry(4, R, 2, QP_FACTOR_MID, &[-4, 4]),
    entry(2, R, 3, QP_FACTOR_MID, &[-2, 2, 6]),
    entry(1, N, 4, QP_FACTOR_LEAF, &[-1, 1, 3, 7]),
    entry(3, N, 4, QP_FACTOR_LEAF, &[-1, 1, -3, 5]),
    entry(6, R, 3, QP_FACTOR_MID, &[-2, 2, -6]),
    entry(5, N, 4, QP_FACTOR_LEAF, &[-1, 1, 3, -5]),
    entry(7, N, 4, QP_FACTOR_LEAF, &[-1, 1, -7]),
];

/// 按 GOP 大小查表, 大小为 1 或超过 8 时没有中间位置
pub fn pattern(gop_size: usize) -> Option<&'static [PatternEntry]> {
    match gop_size {
        2 => Some(GOP_2),
        3 => Some(GOP_3),
        4 => Some(GOP_4),
        5 => Some(GOP_5),
        6 => Some(GOP_6),
        7 => Some(GOP_7),
        STEADY_GOP_SIZE => Some(GOP_8),
        _ => None,
    }
}
