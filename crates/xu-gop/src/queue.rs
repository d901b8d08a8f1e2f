//! 编码顺序调度器.
//!
//! `PictureQueue` 串起输入缓冲、预分析、规划器与时间戳队列.
//! 外部驱动循环每请求一幅待编码图像就调用一次 `pull()`:
//!
//! 1. 只收到一幅图像且输入未结束时推迟, 保证时间戳外推已经完成
//! 2. 推进规划器一次
//! 3. 前 8 个位置中若有未释放的帧内描述, 优先且只能释放它
//! 4. 否则按窗口顺序选第一个所有正向参考都已释放的位置,
//!    遇到第一个未规划的位置即停止
//! 5. 取出图像, 弹出队首已释放的条目, 分配解码时间戳
//!
//! 没有可释放的图像时返回 `None`, 由调用方决定送入更多输入或稍后重试.

use log::{trace, warn};
use xu_core::{Picture, XuResult};

use crate::config::QueueConfig;
use crate::descriptor::Docket;
use crate::intake::IntakeBuffer;
use crate::planner::GopPlanner;
use crate::preanalysis::{NullPreanalyser, PreanalysisStage, Preanalyser};
use crate::timestamps::ReorderQueue;
use crate::window::{SequenceState, Window};

/// 帧内优先扫描的窗口跨度
const INTRA_PRIORITY_SPAN: usize = 8;

/// 图像重排调度队列
///
/// `A` 为自适应量化注释类型, 队列只负责原样透传.
#[derive(Debug)]
pub struct PictureQueue<A = ()> {
    intake: IntakeBuffer<A>,
    preanalysis: PreanalysisStage,
    window: Window<A>,
    planner: GopPlanner,
    state: SequenceState,
    timestamps: ReorderQueue,
}

impl<A> PictureQueue<A> {
    /// 创建队列, 配置非法时返回 `XuError::InvalidConfig`
    pub fn new(config: QueueConfig) -> XuResult<Self> {
        Self::with_preanalyser(config, Box::new(NullPreanalyser))
    }

    /// 使用自定义预分析器创建队列
    pub fn with_preanalyser(config: QueueConfig, analyser: Box<dyn Preanalyser>) -> XuResult<Self> {
        Ok(Self {
            intake: IntakeBuffer::new(),
            preanalysis: PreanalysisStage::new(analyser),
            window: Window::new(),
            planner: GopPlanner::new(&config)?,
            state: SequenceState::default(),
            timestamps: ReorderQueue::new(),
        })
    }

    /// 按显示顺序送入一幅图像
    pub fn accept(&mut self, picture: Picture, aq_info: Option<A>) -> XuResult<()> {
        let pts = picture.pts;
        self.intake.accept(picture, aq_info)?;
        self.timestamps.record(pts);
        Ok(())
    }

    /// 标记输入结束
    pub fn end_of_input(&mut self) {
        self.intake.signal_end_of_input();
    }

    /// 输入是否已结束
    pub fn is_finishing(&self) -> bool {
        self.intake.is_finishing()
    }

    /// 运行一次预分析, 返回移入调度窗口的图像数
    pub fn preanalyse(&mut self) -> usize {
        self.preanalysis.run(&mut self.intake, &mut self.window)
    }

    /// 更新场景切换标志 (按绝对图像位置索引), 空列表保留原有标志
    pub fn set_scene_cuts(&mut self, cuts: Vec<bool>) {
        self.planner.set_scene_cuts(cuts);
    }

    /// 取出下一幅可编码的图像
    pub fn pull(&mut self) -> Option<Docket<A>> {
        let finishing = self.intake.is_finishing();
        if self.timestamps.recorded() == 1 && !finishing {
            return None;
        }

        self.planner.plan(&mut self.state, &mut self.window, finishing);

        let selected = self.intra_priority().or_else(|| self.first_eligible());
        let released = selected.and_then(|index| self.window.release(index));
        self.window.retire(&mut self.state);

        let released = released?;
        let dts = self.timestamps.next().unwrap_or_else(|| {
            warn!("时间戳队列为空, poc={} 使用 PTS 作为 DTS", released.descriptor.poc);
            released.picture.pts
        });
        trace!(
            "释放 poc={} {} dts={} 基线={}",
            released.descriptor.poc, released.descriptor.nal_class, dts, self.state.front
        );

        Some(Docket {
            descriptor: released.descriptor,
            picture: released.picture,
            aq_info: released.aq_info,
            analysis: released.analysis,
            dts,
        })
    }

    /// 窗口前部未释放的帧内描述位置
    fn intra_priority(&self) -> Option<usize> {
        self.window
            .iter()
            .take(INTRA_PRIORITY_SPAN)
            .map_while(|entry| entry.descriptor().map(|d| (entry, d)))
            .position(|(entry, d)| d.is_intra() && !entry.is_released())
    }

    /// 第一个依赖已全部满足的未释放位置
    fn first_eligible(&self) -> Option<usize> {
        self.window
            .iter()
            .enumerate()
            .map_while(|(index, entry)| entry.descriptor().map(|d| (index, entry, d)))
            .find(|(index, entry, d)| {
                !entry.is_released()
                    && d
                        .references
                        .positive
                        .iter()
                        .all(|&delta| self.window.is_released(index + delta as usize))
            })
            .map(|(index, _, _)| index)
    }

    /// 尚未释放的图像数 (含输入缓冲与调度窗口)
    pub fn pending(&self) -> usize {
        self.intake.len() + self.window.iter().filter(|e| !e.is_released()).count()
    }

    /// 调度窗口长度
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// 当前序列计数器
    pub fn sequence_state(&self) -> SequenceState {
        self.state
    }

    /// 规划过程中被丢弃的正向参考数
    pub fn dropped_references(&self) -> usize {
        self.planner.dropped_references()
    }
}
