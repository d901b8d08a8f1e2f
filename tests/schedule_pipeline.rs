//! 图像重排调度集成测试
//!
//! 模拟编码器驱动循环: 逐幅送入图像、预分析、拉取编码单,
//! 输入结束后持续拉取直到耗尽, 再对释放顺序做整体校验.

use std::collections::HashMap;

use bytes::Bytes;
use xu::core::{Picture, XuError};
use xu::gop::{
    Docket, LookaheadAnalysis, NalClass, PictureQueue, Preanalyser, QueueConfig, REORDER_DELAY,
    SliceType,
};

// ============================================================
// 驱动辅助
// ============================================================

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(gop_size: u32, intra_period: u32) -> QueueConfig {
    QueueConfig {
        intra_period,
        gop_size,
        ..QueueConfig::default()
    }
}

/// 送入 `pts` 序列并拉取到耗尽, 返回释放顺序与丢弃的参考数
fn drive(mut queue: PictureQueue, pts: &[i64]) -> (Vec<Docket>, usize) {
    init_logger();
    let mut out = Vec::new();
    for &t in pts {
        let luma = Bytes::from(vec![(t & 0xFF) as u8; 16]);
        queue
            .accept(Picture::new(t, 4, 4).with_plane(luma), None)
            .expect("输入未结束时应接受图像");
        queue.preanalyse();
        while let Some(d) = queue.pull() {
            out.push(d);
        }
    }

    queue.end_of_input();
    // 每次拉取至多释放一幅, 上限足够宽松
    for _ in 0..pts.len() * 4 + 8 {
        queue.preanalyse();
        match queue.pull() {
            Some(d) => out.push(d),
            None if queue.pending() == 0 => break,
            None => {}
        }
    }
    assert_eq!(queue.pending(), 0, "拉取结束后不应有残留图像");
    let dropped = queue.dropped_references();
    (out, dropped)
}

fn run(cfg: QueueConfig, n: i64) -> Vec<Docket> {
    let queue = PictureQueue::new(cfg).expect("配置应合法");
    let pts: Vec<i64> = (0..n).collect();
    let (out, dropped) = drive(queue, &pts);
    assert_eq!(dropped, 0, "参考表不应产生被丢弃的正向参考");
    out
}

fn pocs(out: &[Docket]) -> Vec<i64> {
    out.iter().map(|d| d.descriptor.poc).collect()
}

fn set(refs: &std::collections::BTreeSet<i32>) -> Vec<i32> {
    refs.iter().copied().collect()
}

// ============================================================
// 守恒与依赖顺序
// ============================================================

#[test]
fn test_每幅图像恰好释放一次() {
    for gop_size in [1, 8] {
        for intra_period in [1, 4, 8, 13, 1000] {
            for n in [1, 2, 3, 5, 9, 10, 17, 30, 64] {
                let out = run(config(gop_size, intra_period), n);
                let mut seen = pocs(&out);
                seen.sort_unstable();
                assert_eq!(
                    seen,
                    (0..n).collect::<Vec<_>>(),
                    "gop={gop_size} period={intra_period} n={n}"
                );
                for d in &out {
                    assert_eq!(d.picture.pts, d.descriptor.poc, "图像与描述错位");
                }
            }
        }
    }
}

#[test]
fn test_释放顺序满足参考依赖() {
    for gop_size in [1, 8] {
        for intra_period in [3, 8, 21, 1000] {
            for n in [2, 7, 14, 33, 50] {
                let out = run(config(gop_size, intra_period), n);
                let order: HashMap<i64, usize> = out
                    .iter()
                    .enumerate()
                    .map(|(i, d)| (d.descriptor.poc, i))
                    .collect();

                for (i, d) in out.iter().enumerate() {
                    let refs = &d.descriptor.references;
                    let targets = refs
                        .positive
                        .iter()
                        .chain(refs.negative.iter())
                        .map(|&delta| d.descriptor.poc + i64::from(delta))
                        .filter(|&poc| poc >= 0);
                    for target in targets {
                        let released_at = order[&target];
                        assert!(
                            released_at < i,
                            "poc {} 依赖的 poc {} 未先释放 (gop={gop_size} period={intra_period} n={n})",
                            d.descriptor.poc,
                            target
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_帧内图像只出现在刷新点() {
    let out = run(config(8, 13), 40);
    let intra: Vec<i64> = out
        .iter()
        .filter(|d| d.descriptor.slice_type == SliceType::I)
        .map(|d| d.descriptor.poc)
        .collect();
    assert_eq!(intra, vec![0, 13, 26, 39]);
    assert_eq!(out[0].descriptor.nal_class, NalClass::IdrNLp);
    assert!(out
        .iter()
        .filter(|d| d.descriptor.poc > 0 && d.descriptor.slice_type == SliceType::I)
        .all(|d| d.descriptor.nal_class == NalClass::Cra));
}

// ============================================================
// 稳态结构
// ============================================================

/// 稳态组内 (相对位置, NAL, QP 偏移, 负偏移, 正偏移), 按释放顺序
fn steady_state_expectation() -> Vec<(i64, NalClass, i32, Vec<i32>, Vec<i32>)> {
    use NalClass::{TrailN, TrailR};
    vec![
        (8, TrailR, 1, vec![-8], vec![]),
        (4, TrailR, 2, vec![-4], vec![4]),
        (2, TrailR, 3, vec![-2], vec![2, 6]),
        (1, TrailN, 4, vec![-1], vec![1, 3, 7]),
        (3, TrailN, 4, vec![-3, -1], vec![1, 5]),
        (6, TrailR, 3, vec![-6, -2], vec![2]),
        (5, TrailN, 4, vec![-5, -1], vec![1, 3]),
        (7, TrailN, 4, vec![-7, -1], vec![1]),
    ]
}

#[test]
fn test_稳态每八幅重复同一金字塔() {
    let out = run(config(8, 1000), 1 + 8 * 4);
    assert_eq!(out[0].descriptor.poc, 0);

    let expected = steady_state_expectation();
    for (group, chunk) in out[1..].chunks(8).enumerate() {
        let base = group as i64 * 8;
        assert_eq!(chunk.len(), 8);
        for (d, (pos, nal, qp, neg, positive)) in chunk.iter().zip(&expected) {
            let desc = &d.descriptor;
            assert_eq!(desc.poc, base + pos, "第 {group} 组释放顺序不符");
            assert_eq!(desc.nal_class, *nal);
            assert_eq!(desc.qp_offset, *qp);
            assert_eq!(desc.gop_size, 8);
            assert_eq!(set(&desc.references.negative), *neg);
            assert_eq!(set(&desc.references.positive), *positive);
        }
    }
}

#[test]
fn test_qp_因子随层级变化() {
    let out = run(config(8, 1000), 9);
    let factor = |poc: i64| {
        out.iter()
            .find(|d| d.descriptor.poc == poc)
            .map(|d| d.descriptor.qp_factor)
            .unwrap()
    };
    assert!((factor(8) - 0.4420).abs() < 1e-9);
    assert!((factor(4) - 0.3536).abs() < 1e-9);
    assert!((factor(1) - 0.6800).abs() < 1e-9);
}

// ============================================================
// 码流末尾截断
// ============================================================

#[test]
fn test_末尾截断组使用对应大小的结构() {
    // IDR + 一整组 + 剩余 5 幅
    let out = run(config(8, 1000), 14);
    let tail: Vec<_> = out.iter().filter(|d| d.descriptor.poc >= 9).collect();
    assert_eq!(tail.len(), 5);
    assert!(tail.iter().all(|d| d.descriptor.gop_size == 5));

    let release: Vec<i64> = tail.iter().map(|d| d.descriptor.poc).collect();
    assert_eq!(release, vec![13, 11, 9, 10, 12]);

    let last = tail[0];
    assert_eq!(last.descriptor.nal_class, NalClass::TrailR);
    assert_eq!(set(&last.descriptor.references.negative), vec![-5]);
    let mid = tail[1];
    assert_eq!((mid.descriptor.nal_class, mid.descriptor.qp_offset), (NalClass::TrailR, 2));
    assert_eq!(set(&mid.descriptor.references.positive), vec![2]);
}

#[test]
fn test_末尾单幅不套用层级结构() {
    let out = run(config(8, 1000), 10);
    let last = out.last().unwrap();
    assert_eq!(last.descriptor.poc, 9);
    assert_eq!(last.descriptor.gop_size, 1);
    assert_eq!(last.descriptor.nal_class, NalClass::TrailR);
    assert_eq!(last.descriptor.qp_offset, 1);
    assert_eq!(set(&last.descriptor.references.negative), vec![-1]);
    assert!(last.descriptor.references.positive.is_empty());
}

// ============================================================
// 场景切换
// ============================================================

#[test]
fn test_场景切换决定帧内刷新位置() {
    let mut queue = PictureQueue::new(QueueConfig {
        scene_cut: true,
        ..config(8, 32)
    })
    .unwrap();
    let mut cuts = vec![false; 20];
    cuts[5] = true;
    queue.set_scene_cuts(cuts);

    let (out, _) = drive(queue, &(0..20).collect::<Vec<_>>());
    let intra: Vec<i64> = out
        .iter()
        .filter(|d| d.descriptor.slice_type == SliceType::I)
        .map(|d| d.descriptor.poc)
        .collect();
    assert_eq!(intra, vec![0, 5], "刷新点应为切换位置而非周期位置 32");
    assert_eq!(out[1].descriptor.poc, 5);
    assert_eq!(out[1].descriptor.nal_class, NalClass::Cra);
    assert!(out
        .iter()
        .filter(|d| (1..5).contains(&d.descriptor.poc))
        .all(|d| matches!(d.descriptor.nal_class, NalClass::RaslN | NalClass::RaslR)));
}

// ============================================================
// 解码时间戳
// ============================================================

#[test]
fn test_解码时间戳外推与重排() {
    let pts: Vec<i64> = (0..20).map(|i| 1000 + 40 * i).collect();
    let queue = PictureQueue::new(config(8, 1000)).unwrap();
    let (out, _) = drive(queue, &pts);
    assert_eq!(out.len(), 20);

    let dts: Vec<i64> = out.iter().map(|d| d.dts).collect();
    assert_eq!(&dts[..REORDER_DELAY], &[880i64, 920, 960]);
    assert_eq!(&dts[REORDER_DELAY..], &pts[..pts.len() - REORDER_DELAY]);

    for d in &out {
        assert!(d.dts <= d.picture.pts, "poc {} 的 DTS 晚于 PTS", d.descriptor.poc);
    }
}

// ============================================================
// 具体场景
// ============================================================

#[test]
fn test_九幅图像帧内优先释放() {
    let out = run(config(8, 1000), 9);
    assert_eq!(out[0].descriptor.poc, 0);
    assert_eq!(out[1].descriptor.poc, 8, "组尾应先于组内 1..7 释放");

    let out = run(config(8, 8), 9);
    assert_eq!(pocs(&out)[..2], [0i64, 8]);
    assert_eq!(out[1].descriptor.nal_class, NalClass::Cra);
    assert_eq!(out[1].descriptor.slice_type, SliceType::I);
}

#[test]
fn test_输入结束后送入图像报错() {
    let mut queue: PictureQueue = PictureQueue::new(config(8, 32)).unwrap();
    queue.accept(Picture::new(0, 4, 4), None).unwrap();
    queue.end_of_input();
    let err = queue.accept(Picture::new(1, 4, 4), None);
    assert!(matches!(err, Err(XuError::InputClosed)));
}

#[test]
fn test_非法_gop_size_为致命错误() {
    let result: Result<PictureQueue, _> = PictureQueue::new(config(4, 32));
    assert!(matches!(result, Err(XuError::InvalidConfig(_))));
}

// ============================================================
// 预分析注入
// ============================================================

struct LumaAnalyser;

impl Preanalyser for LumaAnalyser {
    fn analyse(&self, batch: &[&Picture]) -> Vec<LookaheadAnalysis> {
        batch
            .iter()
            .map(|p| LookaheadAnalysis {
                complexity: p.first_sample().map(f64::from),
            })
            .collect()
    }
}

#[test]
fn test_预分析结果随编码单输出() {
    let queue = PictureQueue::with_preanalyser(config(8, 1000), Box::new(LumaAnalyser)).unwrap();
    let (out, _) = drive(queue, &(0..12).collect::<Vec<_>>());
    for d in &out {
        assert_eq!(d.analysis.complexity, Some(d.picture.pts as f64));
    }
}
