//! Pipe 指标收集模块
//!
//! 记录每个 stage 的 pipe 耗时与转发/提交结果，并提供在线统计工具。

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// 记录一个上报窗口内 pipe 的累计耗时
///
/// 每个窗口结束、pipe 被 reset 之前调用。
pub fn record_pipe_duration(stage: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;

    histogram!("stream_pipe_duration_ms", "stage" => stage.to_string()).record(ms);
    gauge!("stream_pipe_duration_last_ms", "stage" => stage.to_string()).set(ms);
    counter!("stream_pipe_windows_total", "stage" => stage.to_string()).increment(1);
}

/// 记录消息转发结果
pub fn record_forward(stage: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "stream_pipe_forwards_total",
        "stage" => stage.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录 source 提交结果
pub fn record_commit(stage: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "stream_pipe_commits_total",
        "stage" => stage.to_string(),
        "status" => status
    )
    .increment(1);
}

/// 记录 stage 连接的下游数量
pub fn record_children(stage: &str, children: usize) {
    gauge!("stream_pipe_children", "stage" => stage.to_string()).set(children as f64);
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
