//! Pipe 耗时监控
//!
//! 在每个上报窗口边界读取 pipe 的累计耗时，写入指标后 reset。
//! `PipeMonitor` 同时在内存中聚合各 stage 的窗口统计，便于输出摘要。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::TimedPipe;
use tracing::debug;

use crate::metrics::{
    record_commit, record_forward, record_pipe_duration, RunningStats, StatsSummary,
};

/// 单个 stage 的聚合数据
#[derive(Debug, Clone, Default)]
struct StageStats {
    windows: u64,
    total: Duration,
    window_ms: RunningStats,
    forwards: u64,
    forward_failures: u64,
    commits: u64,
    commit_failures: u64,
}

/// Pipe 耗时监控器
///
/// 与 pipe 一样由单个 owner 驱动，不做内部同步。
#[derive(Debug, Clone, Default)]
pub struct PipeMonitor {
    stages: BTreeMap<String, StageStats>,
}

impl PipeMonitor {
    /// 创建监控器
    pub fn new() -> Self {
        Self::default()
    }

    /// 关闭 `stage` 的当前窗口
    ///
    /// 读取累计耗时、记录指标、reset pipe，返回该窗口耗时。
    pub fn observe<P: TimedPipe + ?Sized>(&mut self, stage: &str, pipe: &mut P) -> Duration {
        let spent = pipe.duration();
        pipe.reset();

        record_pipe_duration(stage, spent);

        let stats = self.stage_mut(stage);
        stats.windows += 1;
        stats.total = stats.total.saturating_add(spent);
        stats.window_ms.push(spent.as_secs_f64() * 1000.0);

        debug!(
            stage = stage,
            duration_us = spent.as_micros() as u64,
            windows = stats.windows,
            "Pipe window closed"
        );

        spent
    }

    /// 记录一次转发结果
    pub fn note_forward(&mut self, stage: &str, success: bool) {
        record_forward(stage, success);
        let stats = self.stage_mut(stage);
        stats.forwards += 1;
        if !success {
            stats.forward_failures += 1;
        }
    }

    /// 记录一次提交结果
    pub fn note_commit(&mut self, stage: &str, success: bool) {
        record_commit(stage, success);
        let stats = self.stage_mut(stage);
        stats.commits += 1;
        if !success {
            stats.commit_failures += 1;
        }
    }

    /// 生成摘要
    pub fn summary(&self) -> MonitorSummary {
        MonitorSummary {
            stages: self
                .stages
                .iter()
                .map(|(stage, stats)| StageSummary {
                    stage: stage.clone(),
                    windows: stats.windows,
                    total: stats.total,
                    window_ms: StatsSummary::from(&stats.window_ms),
                    forwards: stats.forwards,
                    forward_failures: stats.forward_failures,
                    commits: stats.commits,
                    commit_failures: stats.commit_failures,
                })
                .collect(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        self.stages.clear();
    }

    fn stage_mut(&mut self, stage: &str) -> &mut StageStats {
        self.stages.entry(stage.to_string()).or_default()
    }
}

/// 监控摘要 (按 stage 名排序)
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    pub stages: Vec<StageSummary>,
}

impl MonitorSummary {
    /// 按名称查找 stage
    pub fn stage(&self, name: &str) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

/// 单个 stage 摘要
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    pub stage: String,
    pub windows: u64,
    pub total: Duration,
    pub window_ms: StatsSummary,
    pub forwards: u64,
    pub forward_failures: u64,
    pub commits: u64,
    pub commit_failures: u64,
}

impl std::fmt::Display for MonitorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pipe Metrics Summary ===")?;
        for stage in &self.stages {
            writeln!(f, "Stage: {}", stage.stage)?;
            writeln!(
                f,
                "  Pipe time: {:.3}ms over {} windows",
                stage.total.as_secs_f64() * 1000.0,
                stage.windows
            )?;
            writeln!(f, "  Window (ms): {}", stage.window_ms)?;
            writeln!(
                f,
                "  Forwards: {} ({} failed)",
                stage.forwards, stage.forward_failures
            )?;
            writeln!(
                f,
                "  Commits: {} ({} failed)",
                stage.commits, stage.commit_failures
            )?;
        }
        Ok(())
    }
}
