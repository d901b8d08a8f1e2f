//! 预分析阶段.
//!
//! 图像在输入缓冲中攒够一批 (`BATCH_SIZE`) 或输入结束后, 成批交给
//! `Preanalyser` 计算每幅图像的前瞻分析结果, 再按原顺序移入调度窗口.
//! 分析结果目前不影响调度决策, 是为多遍决策预留的扩展点.

use log::trace;
use xu_core::Picture;

use crate::intake::IntakeBuffer;
use crate::window::Window;

/// 每批预分析的图像数
pub const BATCH_SIZE: usize = 10;

/// 单幅图像的前瞻分析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookaheadAnalysis {
    /// 帧复杂度估计, 分析器未提供时为 `None`
    pub complexity: Option<f64>,
}

/// 预分析器
///
/// 对一批图像给出逐幅的分析结果. 返回结果少于批大小时, 缺失部分按默认值补齐.
pub trait Preanalyser: Send {
    fn analyse(&self, batch: &[&Picture]) -> Vec<LookaheadAnalysis>;
}

/// 不做任何分析的预分析器
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPreanalyser;

impl Preanalyser for NullPreanalyser {
    fn analyse(&self, batch: &[&Picture]) -> Vec<LookaheadAnalysis> {
        vec![LookaheadAnalysis::default(); batch.len()]
    }
}

/// 预分析阶段
pub struct PreanalysisStage {
    analyser: Box<dyn Preanalyser>,
}

impl Default for PreanalysisStage {
    fn default() -> Self {
        Self::new(Box::new(NullPreanalyser))
    }
}

impl std::fmt::Debug for PreanalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreanalysisStage").finish_non_exhaustive()
    }
}

impl PreanalysisStage {
    pub fn new(analyser: Box<dyn Preanalyser>) -> Self {
        Self { analyser }
    }

    /// 条件满足时处理一批图像, 返回移入窗口的图像数
    ///
    /// 条件不满足时什么也不做, 返回 0.
    pub fn run<A>(&self, intake: &mut IntakeBuffer<A>, window: &mut Window<A>) -> usize {
        if intake.len() < BATCH_SIZE && !intake.is_finishing() {
            return 0;
        }
        let batch = intake.take_front(BATCH_SIZE);
        if batch.is_empty() {
            return 0;
        }

        let pictures: Vec<&Picture> = batch.iter().map(|item| &item.picture).collect();
        let mut results = self.analyser.analyse(&pictures).into_iter();

        let moved = batch.len();
        for item in batch {
            let analysis = results.next().unwrap_or_default();
            window.push(item.picture, item.aq_info, analysis);
        }
        trace!("预分析完成 {} 幅图像, 窗口长度 {}", moved, window.len());
        moved
    }
}
