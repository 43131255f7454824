//! Cache behaviour as seen by a dashboard session

use chrono::NaiveDate;
use std::sync::Arc;
use std::thread;
use svcdash::cache::{CacheKeyStrategy, ChartCache};
use svcdash::config::CacheConfig;
use svcdash::{aggregate, FilterSpec, Record};

fn session_records(operators: &[&str]) -> Vec<Record> {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    operators
        .iter()
        .enumerate()
        .map(|(i, op)| {
            Record::new()
                .with_operator(*op)
                .with_registered_at(start + chrono::Duration::days(i as i64))
        })
        .collect()
}

#[test]
fn test_cached_result_matches_direct_aggregation() {
    let cache = ChartCache::from_config(&CacheConfig::default());
    let records = session_records(&["A", "B", "A"]);
    let filters = FilterSpec::new()
        .with_date_from("2024-05-01")
        .with_date_to("2024-05-03");

    let cached = cache.chart_data(&records, &filters);
    assert_eq!(*cached, aggregate(&records, &filters));
    assert_eq!(*cache.chart_data(&records, &filters), *cached);
}

#[test]
fn test_boundary_key_collision_is_a_known_tradeoff() {
    let filters = FilterSpec::default();
    let first = session_records(&["A", "B", "C"]);
    let second = session_records(&["A", "Z", "C"]);

    let boundary = ChartCache::new(10, CacheKeyStrategy::Boundary);
    boundary.chart_data(&first, &filters);
    let stale = boundary.chart_data(&second, &filters);
    // Same length and boundary timestamps: the first dataset's charts come back
    assert!(stale.by_operator.iter().any(|e| e.key == "B"));

    // Bypass always reflects the actual input
    let fresh = boundary.refresh(&second, &filters);
    assert!(fresh.by_operator.iter().any(|e| e.key == "Z"));

    let content = ChartCache::new(10, CacheKeyStrategy::Content);
    content.chart_data(&first, &filters);
    let exact = content.chart_data(&second, &filters);
    assert!(exact.by_operator.iter().any(|e| e.key == "Z"));
    assert_eq!(content.stats().misses, 2);
}

#[test]
fn test_shared_across_threads() {
    let cache = Arc::new(ChartCache::new(4, CacheKeyStrategy::Content));
    let datasets: Vec<Arc<Vec<Record>>> = (1..=8)
        .map(|n| {
            let ops: Vec<String> = (0..n).map(|i| format!("op{}", i)).collect();
            let refs: Vec<&str> = ops.iter().map(String::as_str).collect();
            Arc::new(session_records(&refs))
        })
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let datasets = datasets.clone();
            thread::spawn(move || {
                for round in 0..20 {
                    let data = &datasets[(t + round) % datasets.len()];
                    let bundle = cache.chart_data(data, &FilterSpec::default());
                    assert_eq!(bundle.by_hour.len(), 24);
                    assert_eq!(
                        bundle.by_operator.iter().map(|e| e.count).sum::<u64>() as usize,
                        data.len()
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert!(stats.size <= 4);
    assert_eq!(stats.hits + stats.misses, 160);
}
