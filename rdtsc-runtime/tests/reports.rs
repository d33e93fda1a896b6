//! End-to-end: measure real instrumented-style calls, aggregate, and write
//! the two file-backed reports to their fixed relative paths.
//!
//! Single #[test] because the fixed report paths are relative to the process
//! working directory, which this test changes.

use rdtsc_runtime::{report, sys, tsc, Profiler};

/// CPU-bound workload: wrapping arithmetic over a buffer.
fn burn_cpu(iterations: u64) {
    let mut buf = [0x42u8; 1024];
    for i in 0..iterations {
        for b in &mut buf {
            *b = b.wrapping_add(i as u8).wrapping_mul(31);
        }
    }
    std::hint::black_box(&buf);
}

/// What an instrumented entry/exit wrapper does: time the body with the
/// combined cycle-and-core read on both sides, then record.
fn timed_call(profiler: &Profiler, name: &str, iterations: u64) {
    let (start_cycles, core_start) = tsc::read_cycles_and_core();
    burn_cpu(iterations);
    let (end_cycles, core_end) = tsc::read_cycles_and_core();
    profiler
        .record_call(
            sys::pid(),
            sys::tid(),
            core_start,
            core_end,
            end_cycles.wrapping_sub(start_cycles),
            name,
        )
        .unwrap();
}

#[test]
fn measured_run_produces_both_reports() {
    let dir = tempfile::TempDir::new().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let profiler = Profiler::with_capacity(64);
    for _ in 0..5 {
        timed_call(&profiler, "heavy", 2_000);
    }
    for _ in 0..10 {
        timed_call(&profiler, "light", 100);
    }

    let mut profiler = profiler;
    let n = profiler.populated();
    assert_eq!(n, 15);
    profiler.analyze(n).unwrap();

    let analysis = profiler.analysis();
    assert_eq!(analysis.module.nfuncs, 2);
    assert_eq!(analysis.module.nthreads, 1);
    assert!(analysis.module.core_switch_ratio >= 0.0);
    assert!(analysis.module.core_switch_ratio <= 1.0);

    let heavy = analysis.functions.iter().find(|f| f.name == "heavy").unwrap();
    let light = analysis.functions.iter().find(|f| f.name == "light").unwrap();
    assert_eq!(heavy.calls, 5);
    assert_eq!(light.calls, 10);
    assert!(
        heavy.max_cycles > light.max_cycles,
        "heavy ({}) should cost more cycles than light ({})",
        heavy.max_cycles,
        light.max_cycles
    );

    profiler.write_raw_text(n).unwrap();
    profiler.write_raw_csv(n).unwrap();

    let raw = std::fs::read_to_string(report::RAW_REPORT_PATH).unwrap();
    assert!(raw.contains("FULL FUNCTIONS INFO"));
    // banner + blank + header + 15 rows (trailing blank dropped by lines()).
    assert_eq!(raw.lines().count(), 3 + 15);

    let csv = std::fs::read_to_string(report::CSV_REPORT_PATH).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(report::CSV_HEADER));
    assert_eq!(lines.count(), 15);

    let pid = sys::pid().to_string();
    for row in csv.lines().skip(1) {
        assert!(row.starts_with(&pid), "row missing pid: {row}");
    }
}
