use idle_core::MetricsSnapshot;
use serde::Serialize;

type Extractor = (&'static str, fn(&MetricsSnapshot) -> f64);

/// Final-frame figures compared across seeds.
fn extractors() -> [Extractor; 11] {
    [
        ("score", |s| s.score as f64),
        ("ore_storage_used_pct", |s| f64::from(s.ore_storage_used_pct)),
        ("goods_storage_used_pct", |s| f64::from(s.goods_storage_used_pct)),
        ("planets_active", |s| f64::from(s.planets_active)),
        ("fleet_total", |s| f64::from(s.fleet_total)),
        ("fleet_idle_pct", |s| {
            if s.fleet_total == 0 {
                0.0
            } else {
                f64::from(s.fleet_idle) / f64::from(s.fleet_total)
            }
        }),
        ("delivery_amount", |s| s.delivery_amount as f64),
        ("factories_total", |s| f64::from(s.factories_total)),
        ("goods_per_cycle_total", |s| s.goods_per_cycle_total as f64),
        ("sell_price", |s| s.sell_price as f64),
        ("traders_active", |s| f64::from(s.traders_active)),
    ]
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub seed_count: usize,
    pub stalled_count: usize,
    pub metrics: Vec<MetricSummary>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

pub fn compute_summary(snapshots: &[&MetricsSnapshot]) -> SummaryStats {
    let stalled_count = snapshots
        .iter()
        .filter(|s| crate::run_result::detect_stall(s).is_some())
        .count();

    let metrics = extractors()
        .iter()
        .map(|(name, extract)| {
            let values: Vec<f64> = snapshots.iter().map(|s| extract(s)).collect();
            compute_metric_summary(name, &values)
        })
        .collect();

    SummaryStats {
        seed_count: snapshots.len(),
        stalled_count,
        metrics,
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev: variance.sqrt(),
    }
}

pub fn print_summary(scenario_name: &str, frames: u64, stats: &SummaryStats) {
    println!(
        "\n=== {} ({} seeds, {} frames each) ===\n",
        scenario_name, stats.seed_count, frames
    );
    println!(
        "{:<26} {:>10} {:>10} {:>10} {:>10}",
        "Metric", "Mean", "Min", "Max", "StdDev"
    );
    println!("{}", "-".repeat(70));
    for metric in &stats.metrics {
        println!(
            "{:<26} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            metric.name, metric.mean, metric.min, metric.max, metric.stddev
        );
    }
    println!(
        "{:<26} {}/{}",
        "stall_rate", stats.stalled_count, stats.seed_count
    );
}
