//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite covers the hot paths of a payroll run:
//! - Single employee calculation
//! - Simulating runs of 100 and 1000 employees
//! - Processing a run through the HTTP router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use nomina_engine::api::{AppState, create_router};
use nomina_engine::calculation::{NoHistory, calculate_employee};
use nomina_engine::config::{ConfigLoader, Roster};
use nomina_engine::models::{
    CompensationInput, Employee, EmploymentStatus, PeriodInput, RunType,
};
use nomina_engine::payroll::{PayrollEngine, Repositories};
use nomina_engine::storage::InMemoryStore;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/gt").expect("Failed to load config")
}

/// A roster of `count` active employees with salaries spread across the
/// IGSS cap and both tax brackets.
fn create_roster(count: usize) -> Roster {
    let employees = (0..count)
        .map(|i| Employee {
            id: format!("emp_{:04}", i),
            name: format!("Empleado {}", i),
            monthly_salary: Decimal::new(300_000 + (i as i64 % 50) * 60_000, 2),
            status: EmploymentStatus::Active,
            department_id: Some(if i % 2 == 0 { "operaciones" } else { "finanzas" }.to_string()),
        })
        .collect();
    Roster {
        employees,
        compensation: Vec::new(),
    }
}

fn create_engine(count: usize) -> PayrollEngine {
    let store = Arc::new(InMemoryStore::from_roster(create_roster(count)));
    PayrollEngine::new(Repositories::in_memory(load_config(), store), "GT")
}

/// Benchmark: one employee through the seven calculation steps.
fn bench_single_employee(c: &mut Criterion) {
    let loader = load_config();
    let cutoff = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let rules = loader.resolve("GT", cutoff).unwrap();
    let employee = &create_roster(1).employees[0];
    let input = CompensationInput::empty(employee.id.clone());

    c.bench_function("single_employee", |b| {
        b.iter(|| {
            black_box(
                calculate_employee(employee, &input, RunType::Ordinary, &rules, cutoff, &NoHistory)
                    .unwrap(),
            )
        })
    });
}

/// Benchmark: simulating runs of increasing size.
fn bench_simulate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    let input = PeriodInput::new("2025-01", RunType::Ordinary)
        .with_cutoff(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());

    for count in [100usize, 1000] {
        let engine = create_engine(count);
        group.throughput(Throughput::Elements(count as u64));
        if count >= 1000 {
            // Reduce sample size for large runs to keep benchmark time reasonable
            group.sample_size(10);
        }
        group.bench_with_input(BenchmarkId::new("employees", count), &count, |b, _| {
            b.iter(|| black_box(engine.simulate(&input).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark: processing a 100-employee run through the HTTP router.
///
/// Re-processing the same period replaces the draft, so every iteration
/// recalculates and saves a new version.
fn bench_process_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(create_engine(100)));
    let body = serde_json::json!({
        "period_label": "2025-01",
        "run_type": "ORDINARY",
        "cutoff_date": "2025-01-31"
    })
    .to_string();

    c.bench_function("process_http_100", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/payroll/runs")
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

criterion_group!(
    benches,
    bench_single_employee,
    bench_simulate_scaling,
    bench_process_http,
);
criterion_main!(benches);
