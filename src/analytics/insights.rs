//! Derived views over an aggregated bundle: period trend and peak hours

use serde::Serialize;

use crate::analytics::models::{ChartEntry, PeriodEntry};

const STRONG_CHANGE_PERCENT: f64 = 10.0;
const MODERATE_CHANGE_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    InsufficientData,
    StrongGrowth,
    ModerateGrowth,
    Stable,
    ModerateDecline,
    StrongDecline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    /// Mean count of the second half minus the first, rounded
    pub average_change: i64,
    /// Percent change relative to the first half, two decimals
    pub growth_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPatterns {
    /// Busiest three hours, busiest first
    pub peak_hours: Vec<ChartEntry>,
    /// Quietest three hours, quietest first
    pub valley_hours: Vec<ChartEntry>,
    pub hourly_average: i64,
    pub total_services: u64,
}

fn mean(counts: &[u64]) -> f64 {
    counts.iter().sum::<u64>() as f64 / counts.len() as f64
}

/// Compare the first half of the series against the second
pub fn calculate_trends(by_period: &[PeriodEntry]) -> TrendAnalysis {
    if by_period.len() < 2 {
        return TrendAnalysis {
            direction: TrendDirection::InsufficientData,
            average_change: 0,
            growth_percent: 0.0,
        };
    }

    let counts: Vec<u64> = by_period.iter().map(|p| p.count).collect();
    let (first, second) = counts.split_at(counts.len().div_ceil(2));

    let initial = mean(first);
    let change = mean(second) - initial;
    let growth = if initial > 0.0 {
        change / initial * 100.0
    } else {
        0.0
    };

    let direction = if growth > STRONG_CHANGE_PERCENT {
        TrendDirection::StrongGrowth
    } else if growth > MODERATE_CHANGE_PERCENT {
        TrendDirection::ModerateGrowth
    } else if growth < -STRONG_CHANGE_PERCENT {
        TrendDirection::StrongDecline
    } else if growth < -MODERATE_CHANGE_PERCENT {
        TrendDirection::ModerateDecline
    } else {
        TrendDirection::Stable
    };

    TrendAnalysis {
        direction,
        average_change: change.round() as i64,
        growth_percent: (growth * 100.0).round() / 100.0,
    }
}

pub fn analyze_hourly_patterns(by_hour: &[ChartEntry]) -> HourlyPatterns {
    if by_hour.is_empty() {
        return HourlyPatterns {
            peak_hours: Vec::new(),
            valley_hours: Vec::new(),
            hourly_average: 0,
            total_services: 0,
        };
    }

    let mut sorted = by_hour.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));

    let peak_hours = sorted.iter().take(3).cloned().collect();
    let valley_hours = sorted.iter().rev().take(3).cloned().collect();

    let total_services: u64 = by_hour.iter().map(|h| h.count).sum();
    let hourly_average = (total_services as f64 / by_hour.len() as f64).round() as i64;

    HourlyPatterns {
        peak_hours,
        valley_hours,
        hourly_average,
        total_services,
    }
}
