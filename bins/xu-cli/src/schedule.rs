//! 调度模拟.
//!
//! 代替编码器驱动循环: 逐幅生成图像送入队列, 每次送入后拉取所有可释放的编码单,
//! 输入结束后持续拉取直到耗尽.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info};
use xu_core::Picture;
use xu_gop::{Docket, PictureQueue, QueueConfig};

/// 模拟参数
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: QueueConfig,
    pub frames: u32,
    pub pts_start: i64,
    pub pts_step: i64,
    pub scene_cuts: Vec<bool>,
}

/// 单个编码单的输出记录
#[derive(Debug, Serialize)]
pub struct ScheduleEntry {
    pub order: usize,
    pub poc: i64,
    pub nal: String,
    pub slice: char,
    pub qp_offset: i32,
    pub qp_factor: f64,
    pub gop_size: usize,
    pub refs_negative: Vec<i32>,
    pub refs_positive: Vec<i32>,
    pub pts: i64,
    pub dts: i64,
}

impl ScheduleEntry {
    fn from_docket(order: usize, docket: &Docket) -> Self {
        let d = &docket.descriptor;
        Self {
            order,
            poc: d.poc,
            nal: d.nal_class.name().to_string(),
            slice: if d.is_intra() { 'I' } else { 'B' },
            qp_offset: d.qp_offset,
            qp_factor: d.qp_factor,
            gop_size: d.gop_size,
            refs_negative: d.references.negative.iter().copied().collect(),
            refs_positive: d.references.positive.iter().copied().collect(),
            pts: docket.picture.pts,
            dts: docket.dts,
        }
    }
}

/// 模拟结果
#[derive(Debug, Serialize)]
pub struct ScheduleReport {
    pub config: QueueConfig,
    pub frames: u32,
    pub released: usize,
    pub dropped_references: usize,
    pub entries: Vec<ScheduleEntry>,
}

/// 解析场景切换列表, 如 "12,40" -> 第 12 与第 40 幅为切换点
pub fn parse_cut_list(spec: &str) -> Result<Vec<bool>> {
    let mut positions = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let pos: usize = part
            .parse()
            .with_context(|| format!("无效的场景切换位置: '{part}'"))?;
        positions.push(pos);
    }
    let len = positions.iter().max().map_or(0, |&m| m + 1);
    let mut flags = vec![false; len];
    for pos in positions {
        flags[pos] = true;
    }
    Ok(flags)
}

fn record(entries: &mut Vec<ScheduleEntry>, docket: &Docket) {
    debug!(
        "释放 poc={} {} dts={}",
        docket.descriptor.poc, docket.descriptor.nal_class, docket.dts
    );
    entries.push(ScheduleEntry::from_docket(entries.len(), docket));
}

/// 运行模拟
pub fn run(sim: &Simulation) -> Result<ScheduleReport> {
    if sim.pts_step <= 0 {
        bail!("pts 步长必须为正数, 实际为 {}", sim.pts_step);
    }

    let mut queue: PictureQueue = PictureQueue::new(sim.config)?;
    queue.set_scene_cuts(sim.scene_cuts.clone());

    let mut entries = Vec::with_capacity(sim.frames as usize);
    for i in 0..i64::from(sim.frames) {
        let pts = sim.pts_start + i * sim.pts_step;
        queue.accept(Picture::new(pts, 1920, 1080), None)?;
        queue.preanalyse();
        while let Some(docket) = queue.pull() {
            record(&mut entries, &docket);
        }
    }

    queue.end_of_input();
    while queue.pending() > 0 {
        let moved = queue.preanalyse();
        match queue.pull() {
            Some(docket) => record(&mut entries, &docket),
            None if moved == 0 => {
                bail!("调度停滞: 仍有 {} 幅图像未释放", queue.pending());
            }
            None => {}
        }
    }

    info!(
        "调度完成: 送入 {} 幅, 释放 {} 幅, 丢弃参考 {}",
        sim.frames,
        entries.len(),
        queue.dropped_references()
    );

    Ok(ScheduleReport {
        config: sim.config,
        frames: sim.frames,
        released: entries.len(),
        dropped_references: queue.dropped_references(),
        entries,
    })
}

/// 以文本表格打印调度结果
pub fn print_table(report: &ScheduleReport) {
    println!(
        "{:>5} {:>6} {:<9} {:>5} {:>4} {:>7} {:>4}  {:<16} {:>8} {:>8}",
        "order", "poc", "nal", "slice", "qp", "factor", "gop", "refs", "pts", "dts"
    );
    for e in &report.entries {
        let refs = format!("{:?}/{:?}", e.refs_negative, e.refs_positive);
        println!(
            "{:>5} {:>6} {:<9} {:>5} {:>+4} {:>7.4} {:>4}  {:<16} {:>8} {:>8}",
            e.order, e.poc, e.nal, e.slice, e.qp_offset, e.qp_factor, e.gop_size, refs, e.pts, e.dts
        );
    }
    println!(
        "共释放 {} / {} 幅, 丢弃参考 {}",
        report.released, report.frames, report.dropped_references
    );
}
