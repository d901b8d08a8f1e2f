//! xu-cli - 编码顺序调度模拟工具
//!
//! 按给定的 GOP 参数模拟一段图像序列, 打印每幅图像的编码顺序、
//! NAL 类型、QP 偏移、参考关系与解码时间戳.

mod logging;
mod schedule;

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use xu_gop::QueueConfig;

use schedule::{Simulation, parse_cut_list, print_table};

#[derive(Parser, Debug)]
#[command(name = "xu-cli", version, about = "视频编码图像重排与 GOP 结构模拟")]
struct Cli {
    /// 模拟的图像数
    #[arg(short = 'n', long, default_value_t = 33)]
    frames: u32,

    /// JSON 配置文件, 命令行参数优先
    #[arg(short, long)]
    config: Option<String>,

    /// 基础 GOP 大小 (1 或 8)
    #[arg(long = "gop-size")]
    gop_size: Option<u32>,

    /// 帧内刷新周期
    #[arg(long = "intra-period")]
    intra_period: Option<u32>,

    /// 场编码
    #[arg(long = "field-coding")]
    field_coding: bool,

    /// 启用场景切换感知的帧内刷新
    #[arg(long = "scene-cut")]
    scene_cut: bool,

    /// 场景切换位置列表 (如 "12,40")
    #[arg(long)]
    cuts: Option<String>,

    /// 第一幅图像的 PTS
    #[arg(long = "pts-start", default_value_t = 0)]
    pts_start: i64,

    /// 相邻图像的 PTS 间隔
    #[arg(long = "pts-step", default_value_t = 1)]
    pts_step: i64,

    /// 以 JSON 格式输出
    #[arg(long)]
    json: bool,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 合并配置文件与命令行参数
fn resolve_config(cli: &Cli) -> Result<QueueConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败, path={path}"))?;
            serde_json::from_str::<QueueConfig>(&text)
                .with_context(|| format!("解析配置文件失败, path={path}"))?
        }
        None => QueueConfig::default(),
    };

    if let Some(gop_size) = cli.gop_size {
        config.gop_size = gop_size;
    }
    if let Some(intra_period) = cli.intra_period {
        config.intra_period = intra_period;
    }
    config.field_coding |= cli.field_coding;
    config.scene_cut |= cli.scene_cut;
    config.validate()?;
    Ok(config)
}

fn execute(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let scene_cuts = match &cli.cuts {
        Some(list) => parse_cut_list(list)?,
        None => Vec::new(),
    };
    tracing::info!("模拟配置: {:?}, 图像数 {}", config, cli.frames);

    let report = schedule::run(&Simulation {
        config,
        frames: cli.frames,
        pts_start: cli.pts_start,
        pts_step: cli.pts_step,
        scene_cuts,
    })?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("序列化调度结果失败")?;
        println!("{json}");
    } else {
        print_table(&report);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("xu-cli", cli.verbose) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    if let Err(e) = execute(&cli) {
        tracing::error!("{e:#}");
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}
