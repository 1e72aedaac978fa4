//! Tick-time monitoring
//!
//! Tracks how much of the fixed period each session step consumes, for the
//! periodic stats log and an overload warning.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rolling window length in steps
const MAX_SAMPLES: usize = 120;
/// Steps recorded before a status is derived
const MIN_SAMPLES: usize = 10;

/// Performance status levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceStatus {
    /// Well under budget
    Excellent,
    Good,
    /// Close to the period
    Warning,
    /// Steps take about as long as the period or longer
    Critical,
}

impl PerformanceStatus {
    pub fn is_overloaded(self) -> bool {
        matches!(self, PerformanceStatus::Critical)
    }
}

/// Monitor that tracks step durations against the period budget
pub struct PerformanceMonitor {
    /// Rolling window of step durations
    tick_durations: VecDeque<Duration>,
    /// Target step duration (budget)
    budget: Duration,
    /// Threshold for excellent performance (fraction of budget)
    excellent_threshold: f32,
    /// Threshold for warning (fraction of budget)
    warning_threshold: f32,
    /// Threshold for critical (fraction of budget)
    critical_threshold: f32,
    status: PerformanceStatus,
    tick_start: Option<Instant>,
    last_entity_count: usize,
}

impl PerformanceMonitor {
    pub fn new(period: Duration) -> Self {
        Self {
            tick_durations: VecDeque::with_capacity(MAX_SAMPLES),
            budget: period.max(Duration::from_millis(1)),
            excellent_threshold: 0.3, // < 30% of budget = excellent
            warning_threshold: 0.7,   // > 70% of budget = warning
            critical_threshold: 0.9,  // > 90% of budget = critical
            status: PerformanceStatus::Excellent,
            tick_start: None,
            last_entity_count: 0,
        }
    }

    /// Start timing a step
    pub fn tick_start(&mut self) {
        self.tick_start = Some(Instant::now());
    }

    /// End timing a step and record the duration
    pub fn tick_end(&mut self, entity_count: usize) {
        if let Some(start) = self.tick_start.take() {
            self.record_tick(start.elapsed());
            self.last_entity_count = entity_count;
        }
    }

    fn record_tick(&mut self, duration: Duration) {
        self.tick_durations.push_back(duration);
        while self.tick_durations.len() > MAX_SAMPLES {
            self.tick_durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.tick_durations.len() < MIN_SAMPLES {
            return;
        }
        let ratio = self.budget_usage_percent() / 100.0;
        self.status = if ratio < self.excellent_threshold {
            PerformanceStatus::Excellent
        } else if ratio < self.warning_threshold {
            PerformanceStatus::Good
        } else if ratio < self.critical_threshold {
            PerformanceStatus::Warning
        } else {
            PerformanceStatus::Critical
        };
    }

    pub fn average_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.tick_durations.iter().sum();
        sum / self.tick_durations.len() as u32
    }

    /// Get the 95th percentile step duration
    pub fn p95_tick_duration(&self) -> Duration {
        if self.tick_durations.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.tick_durations.iter().copied().collect();
        sorted.sort();
        let idx = (sorted.len() as f32 * 0.95) as usize;
        sorted.get(idx.min(sorted.len() - 1)).copied().unwrap_or(Duration::ZERO)
    }

    pub fn status(&self) -> PerformanceStatus {
        self.status
    }

    /// Budget usage as percentage (0-100+)
    pub fn budget_usage_percent(&self) -> f32 {
        self.average_tick_duration().as_secs_f32() / self.budget.as_secs_f32() * 100.0
    }

    pub fn last_entity_count(&self) -> usize {
        self.last_entity_count
    }
}
