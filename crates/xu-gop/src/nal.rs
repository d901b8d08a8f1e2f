//! HEVC 图像级 NAL 类型.
//!
//! 调度器只会产生其中几种 VCL 类型, 类型编号与 H.265 表 7-1 一致.

use std::fmt;

/// 图像的 NAL 类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NalClass {
    /// TRAIL_N (非参考尾随图像)
    TrailN,
    /// TRAIL_R (参考尾随图像)
    TrailR,
    /// RASL_N (随机接入跳过的前导图像, 非参考)
    RaslN,
    /// RASL_R (随机接入跳过的前导图像, 参考)
    RaslR,
    /// IDR_N_LP (无前导图像的即时解码刷新)
    IdrNLp,
    /// CRA_NUT (Clean Random Access)
    Cra,
}

impl NalClass {
    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::TrailN => 0,
            Self::TrailR => 1,
            Self::RaslN => 8,
            Self::RaslR => 9,
            Self::IdrNLp => 20,
            Self::Cra => 21,
        }
    }

    /// 是否为 IRAP (Intra Random Access Point)
    pub fn is_irap(&self) -> bool {
        matches!(self.type_id(), 16..=23)
    }

    /// 是否为子层参考图像
    ///
    /// 编号 0..=14 中的偶数为子层非参考类型.
    pub fn is_reference(&self) -> bool {
        let id = self.type_id();
        id > 14 || id % 2 == 1
    }

    /// 标准名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrailN => "TRAIL_N",
            Self::TrailR => "TRAIL_R",
            Self::RaslN => "RASL_N",
            Self::RaslR => "RASL_R",
            Self::IdrNLp => "IDR_N_LP",
            Self::Cra => "CRA_NUT",
        }
    }
}

impl fmt::Display for NalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
