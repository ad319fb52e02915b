//! 分发指标收集模块
//!
//! 基于 `ChannelReport` / `DispatchOutcome` 记录和统计发送结果。

use std::collections::BTreeMap;

use contracts::{ChannelKind, ChannelReport, DispatchOutcome};
use metrics::{counter, gauge, histogram};

/// 从单个渠道报告记录指标
pub fn record_channel_report(report: &ChannelReport) {
    let channel = report.channel.as_str();

    counter!("notifier_sends_total", "channel" => channel, "status" => "success")
        .increment(report.succeeded);
    counter!("notifier_sends_total", "channel" => channel, "status" => "failure")
        .increment(report.failed);

    let skipped = report.skipped();
    if skipped > 0 {
        counter!("notifier_sends_skipped_total", "channel" => channel).increment(skipped);
    }

    if let Some(reason) = report.cancelled {
        counter!(
            "notifier_channel_cancelled_total",
            "channel" => channel,
            "reason" => reason.to_string()
        )
        .increment(1);
    }

    histogram!("notifier_channel_duration_ms", "channel" => channel)
        .record(report.elapsed.as_secs_f64() * 1000.0);
}

/// 记录一次完整分发（两个渠道）
///
/// # Example
///
/// ```ignore
/// let outcome = coordinator.dispatch(&recipients, &signal).await;
/// observability::record_dispatch_outcome(&outcome);
/// ```
pub fn record_dispatch_outcome(outcome: &DispatchOutcome) {
    record_channel_report(&outcome.email);
    record_channel_report(&outcome.sms);

    counter!("notifier_dispatch_runs_total", "state" => state_label(outcome)).increment(1);
    gauge!("notifier_both_succeeded_upper_bound").set(outcome.both_succeeded_upper_bound() as f64);
}

/// 记录输入阶段计数
pub fn record_recipients(total: usize, eligible: usize, unique: usize) {
    gauge!("notifier_recipients", "stage" => "parsed").set(total as f64);
    gauge!("notifier_recipients", "stage" => "eligible").set(eligible as f64);
    gauge!("notifier_recipients", "stage" => "unique").set(unique as f64);
}

fn state_label(outcome: &DispatchOutcome) -> &'static str {
    if outcome.terminal().is_some() {
        "cancelled"
    } else {
        "completed"
    }
}

/// 分发指标聚合器
///
/// 在内存中聚合多次分发的结果，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// 分发次数
    pub runs: u64,

    /// 被取消/超时的分发次数
    pub cancelled_runs: u64,

    /// 各渠道累计
    pub channels: BTreeMap<ChannelKind, ChannelTotals>,
}

/// 单个渠道的累计计数
#[derive(Debug, Clone, Default)]
pub struct ChannelTotals {
    pub recipients: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    /// 每个收件人的平均耗时（毫秒）
    pub per_recipient_ms: RunningStats,
}

impl DispatchMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcome: &DispatchOutcome) {
        self.runs += 1;
        if outcome.terminal().is_some() {
            self.cancelled_runs += 1;
        }

        for report in [&outcome.email, &outcome.sms] {
            let totals = self.channels.entry(report.channel).or_default();
            totals.recipients += report.total as u64;
            totals.succeeded += report.succeeded;
            totals.failed += report.failed;
            totals.skipped += report.skipped();
            if report.attempted > 0 {
                totals
                    .per_recipient_ms
                    .push(report.elapsed.as_secs_f64() * 1000.0 / report.attempted as f64);
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let channels = self
            .channels
            .iter()
            .map(|(kind, totals)| {
                let attempted = totals.succeeded + totals.failed;
                let success_rate = if attempted > 0 {
                    totals.succeeded as f64 / attempted as f64 * 100.0
                } else {
                    0.0
                };
                ChannelSummary {
                    channel: *kind,
                    succeeded: totals.succeeded,
                    failed: totals.failed,
                    skipped: totals.skipped,
                    success_rate,
                    per_recipient_ms: StatsSummary::from(&totals.per_recipient_ms),
                }
            })
            .collect();

        MetricsSummary {
            runs: self.runs,
            cancelled_runs: self.cancelled_runs,
            channels,
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub runs: u64,
    pub cancelled_runs: u64,
    pub channels: Vec<ChannelSummary>,
}

/// 单渠道摘要
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub channel: ChannelKind,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
    pub success_rate: f64,
    pub per_recipient_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(f, "Runs: {} (cancelled: {})", self.runs, self.cancelled_runs)?;
        for ch in &self.channels {
            writeln!(
                f,
                "{}: succeeded={} failed={} skipped={} ({:.2}% success)",
                ch.channel, ch.succeeded, ch.failed, ch.skipped, ch.success_rate
            )?;
            writeln!(f, "  time per recipient (ms): {}", ch.per_recipient_ms)?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
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
                "min={:.3}, max={:.3}, mean={:.3} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

/// 在线统计计算器（最小/最大/均值）
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            self.mean += (value - self.mean) / self.count as f64;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }
}
