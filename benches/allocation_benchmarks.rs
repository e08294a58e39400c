//! Performance benchmarks for the shift allocator.
//!
//! This suite measures:
//! - One month of ICU demand against a 40-person roster
//! - A full year for every configured unit
//! - The same month through the HTTP API
//! - Scaling with roster size
//! - Rebuilding the monthly summary from a year of assignments
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chrono::NaiveDate;
use shift_allocator::allocation::{Allocator, RosterOrder, SeededShuffle};
use shift_allocator::api::{AppState, create_router};
use shift_allocator::config::ConfigLoader;
use shift_allocator::demand::DemandStream;
use shift_allocator::roster::{Roster, StaffRecord, Unavailability};
use shift_allocator::summary::MonthlySummary;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const SHIFTS: [&str; 3] = ["Mañana", "Tarde", "Noche"];

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/sermas").expect("Failed to load config")
}

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// Creates `per_unit` staff for each unit, spread over the three shifts.
fn create_records(units: &[&str], per_unit: usize) -> Vec<StaffRecord> {
    units
        .iter()
        .flat_map(|unit| {
            (0..per_unit).map(move |i| StaffRecord {
                id: Some(format!("{}-{:03}", unit, i)),
                unit: Some(unit.to_string()),
                contract_mode: Some(if i % 4 == 0 { "Parcial" } else { "Completa" }.to_string()),
                shift_type: Some(SHIFTS[i % 3].to_string()),
                unavailable: Some(Unavailability::Text(format!("2025-01-{:02}", i % 28 + 1))),
            })
        })
        .collect()
}

fn create_demand(config: &ConfigLoader, units: &[&str], start: &str, end: &str) -> DemandStream {
    let slots = units
        .iter()
        .flat_map(|unit| {
            let pattern = config.pattern(unit).unwrap();
            DemandStream::generate_range(unit, date(start), date(end), pattern)
                .unwrap()
                .into_slots()
        })
        .collect();
    DemandStream::from_slots(slots)
}

/// Benchmark: One month of ICU demand.
fn bench_single_unit_month(c: &mut Criterion) {
    let config = load_config();
    let roster = Roster::from_records(create_records(&["UCI"], 40), config.policy()).unwrap();
    let demand = create_demand(&config, &["UCI"], "2025-01-01", "2025-01-31");

    c.bench_function("single_unit_month", |b| {
        b.iter(|| {
            let result = Allocator::new(&roster, config.policy(), SeededShuffle::new(7))
                .run(black_box(&demand));
            black_box(result)
        })
    });
}

/// Benchmark: A full year across every configured unit.
fn bench_all_units_year(c: &mut Criterion) {
    let config = load_config();
    let units: Vec<&str> = config.config().patterns().keys().map(String::as_str).collect();
    let roster = Roster::from_records(create_records(&units, 45), config.policy()).unwrap();
    let demand = create_demand(&config, &units, "2025-01-01", "2025-12-31");

    let mut group = c.benchmark_group("annual_allocation");
    group.throughput(Throughput::Elements(demand.len() as u64));
    group.sample_size(10);

    group.bench_function("all_units_year", |b| {
        b.iter(|| {
            let result = Allocator::new(&roster, config.policy(), SeededShuffle::new(7))
                .run(black_box(&demand));
            black_box(result)
        })
    });

    group.finish();
}

/// Benchmark: One month of ICU demand through POST /allocate.
fn bench_api_allocate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));

    let staff: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            serde_json::json!({
                "ID": format!("N{:03}", i),
                "Unidad_Asignada": "UCI",
                "Jornada": if i % 4 == 0 { "Parcial" } else { "Completa" },
                "Turno_Contrato": SHIFTS[i % 3],
                "Fechas_No_Disponibilidad": ""
            })
        })
        .collect();
    let body = serde_json::json!({
        "staff": staff,
        "demand": { "unit": "UCI", "start_date": "2025-01-01", "end_date": "2025-01-31" },
        "seed": 7
    })
    .to_string();

    c.bench_function("api_allocate_month", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/allocate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Scaling with roster size over one quarter.
fn bench_roster_scaling(c: &mut Criterion) {
    let config = load_config();
    let demand = create_demand(&config, &["Urgencias"], "2025-01-01", "2025-03-31");

    let mut group = c.benchmark_group("roster_scaling");
    for size in [15usize, 60, 240] {
        let roster =
            Roster::from_records(create_records(&["Urgencias"], size), config.policy()).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &roster, |b, roster| {
            b.iter(|| {
                let result = Allocator::new(roster, config.policy(), RosterOrder).run(&demand);
                black_box(result)
            })
        });
    }
    group.finish();
}

/// Benchmark: Rebuilding the monthly summary from a year of assignments.
fn bench_summary_rebuild(c: &mut Criterion) {
    let config = load_config();
    let units: Vec<&str> = config.config().patterns().keys().map(String::as_str).collect();
    let roster = Roster::from_records(create_records(&units, 45), config.policy()).unwrap();
    let demand = create_demand(&config, &units, "2025-01-01", "2025-12-31");
    let result = Allocator::new(&roster, config.policy(), RosterOrder).run(&demand);

    let mut group = c.benchmark_group("summary");
    group.throughput(Throughput::Elements(result.assignments.len() as u64));
    group.bench_function("rebuild_year", |b| {
        b.iter(|| black_box(MonthlySummary::rebuild(black_box(&result.assignments))))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_unit_month,
    bench_all_units_year,
    bench_api_allocate,
    bench_roster_scaling,
    bench_summary_rebuild,
);
criterion_main!(benches);
