//! Report rendering: two file-backed raw dumps and two stdout summaries.
//!
//! The file formats are compatibility-sensitive: downstream tooling parses
//! the CSV header and column layout literally, and the summary tables keep
//! the fixed widths and row order of the reference output. Each writer has a
//! `..._to` form taking any `io::Write` so tests can render into a buffer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::aggregate::{FunctionSummary, ModuleSummary};
use crate::error::Error;
use crate::record::CallRecord;

/// Fixed relative path of the raw text report.
pub const RAW_REPORT_PATH: &str = "output-insert-rdtsc.raw";
/// Fixed relative path of the CSV report.
pub const CSV_REPORT_PATH: &str = "output-insert-rdtsc.csv";

/// Literal header line of the CSV report.
pub const CSV_HEADER: &str = "PID,TID,CORE ID START,CORE ID END,CYCLES,FUNCTION NAME";

fn create_report(path: &Path) -> Result<BufWriter<File>, Error> {
    let file = File::create(path).map_err(|source| Error::ReportCreate {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Render the raw fixed-width dump of `records` into `out`.
pub fn write_raw_text_to<W: Write>(records: &[CallRecord], out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "============================= FULL FUNCTIONS INFO ============================="
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>16}  {:>16}  {:>16}  {:>16}  {:>16}  {}",
        "PID", "TID", "CORE ID START", "CORE ID END", "CYCLES", "FUNCTION NAME"
    )?;
    for rec in records {
        writeln!(
            out,
            "{:>16}  {:>16}  {:>16}  {:>16}  {:>16}  {}",
            rec.pid,
            rec.tid,
            rec.core_start,
            rec.core_end,
            rec.cycles,
            rec.name
        )?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the raw dump to [`RAW_REPORT_PATH`], truncating any previous report.
pub fn write_raw_text(records: &[CallRecord]) -> Result<(), Error> {
    let mut out = create_report(Path::new(RAW_REPORT_PATH))?;
    write_raw_text_to(records, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render `records` as CSV into `out`. The function-name field is unquoted.
pub fn write_raw_csv_to<W: Write>(records: &[CallRecord], out: &mut W) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for rec in records {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            rec.pid, rec.tid, rec.core_start, rec.core_end, rec.cycles, rec.name
        )?;
    }
    Ok(())
}

/// Write the CSV dump to [`CSV_REPORT_PATH`], truncating any previous report.
pub fn write_raw_csv(records: &[CallRecord]) -> Result<(), Error> {
    let mut out = create_report(Path::new(CSV_REPORT_PATH))?;
    write_raw_csv_to(records, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render the per-function summary table into `out`, one row per distinct
/// function in first-seen order.
pub fn write_function_summary_to<W: Write>(
    functions: &[FunctionSummary],
    out: &mut W,
) -> io::Result<()> {
    writeln!(
        out,
        "============================== FUNCTIONS SUMMARY =============================="
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:>18}  {:>18}  {:>18}  {}",
        "NUMBER OF CALLS", "NUMBER OF THREADS", "CYCLES MAX", "FUNCTION NAME"
    )?;
    for func in functions {
        writeln!(
            out,
            "{:>18}  {:>18}  {:>18}  {}",
            func.calls,
            func.thread_count(),
            func.max_cycles,
            func.name
        )?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the per-function summary table to standard output.
pub fn write_function_summary(functions: &[FunctionSummary]) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_function_summary_to(functions, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Render the module summary into `out`. The core switch ratio is printed
/// with two decimal digits followed by a percent sign.
pub fn write_module_summary_to<W: Write>(module: &ModuleSummary, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "=============================== MODULE SUMMARY ==============================="
    )?;
    writeln!(out)?;
    writeln!(out, "{:>28}: {}", "number of cores", module.nprocs)?;
    writeln!(
        out,
        "{:>28}: {}",
        "number of cores available", module.nprocs_avail
    )?;
    writeln!(out, "{:>28}: {}", "number of threads appears", module.nthreads)?;
    writeln!(out, "{:>28}: {}", "number of functions", module.nfuncs)?;
    writeln!(
        out,
        "{:>28}: {:.2}%",
        "core switch ratio", module.core_switch_ratio
    )?;
    writeln!(out)?;
    Ok(())
}

/// Write the module summary to standard output.
pub fn write_module_summary(module: &ModuleSummary) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_module_summary_to(module, &mut out)?;
    out.flush()?;
    Ok(())
}
