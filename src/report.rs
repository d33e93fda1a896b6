use std::path::{Path, PathBuf};

use rdtsc_runtime::report::CSV_HEADER;
use rdtsc_runtime::{analyze, CallRecord, FuncName, FunctionSummary};

use crate::error::Error;

/// Parse a CSV capture written by the runtime back into call records.
///
/// The header line must match the runtime's literal header. The function
/// name is the last field and is unquoted, so it may contain commas; only
/// the first five fields are split off.
pub fn load_capture(path: &Path) -> Result<Vec<CallRecord>, Error> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::CaptureRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = contents.lines();
    match lines.next() {
        Some(header) if header == CSV_HEADER => {}
        Some(other) => {
            return Err(Error::InvalidCapture {
                path: path.to_path_buf(),
                reason: format!("unexpected header: {other}"),
            })
        }
        None => {
            return Err(Error::InvalidCapture {
                path: path.to_path_buf(),
                reason: "empty file".into(),
            })
        }
    }

    let mut records = Vec::new();
    for (lineno, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        records.push(parse_row(line).map_err(|reason| Error::InvalidCapture {
            path: path.to_path_buf(),
            reason: format!("line {}: {reason}", lineno + 2),
        })?);
    }
    Ok(records)
}

fn parse_row(line: &str) -> Result<CallRecord, String> {
    let mut fields = line.splitn(6, ',');
    let mut next_u64 = |what: &str| -> Result<u64, String> {
        let field = fields.next().ok_or_else(|| format!("missing {what}"))?;
        field.parse().map_err(|_| format!("bad {what}: {field}"))
    };
    let pid = next_u64("pid")?;
    let tid = next_u64("tid")?;
    let core_start = next_u64("core id start")?;
    let core_end = next_u64("core id end")?;
    let cycles = next_u64("cycles")?;
    let name = fields.next().ok_or("missing function name")?;
    Ok(CallRecord {
        pid,
        tid,
        core_start,
        core_end,
        cycles,
        name: FuncName::new(name),
    })
}

/// Re-aggregate a capture and format it as a text table sorted by max
/// cycles descending, with a one-line footer of module-wide totals.
pub fn format_table(records: &[CallRecord]) -> String {
    let analysis = analyze(records, 0, 0);
    let mut functions: Vec<&FunctionSummary> = analysis.functions.iter().collect();
    functions.sort_by(|a, b| b.max_cycles.cmp(&a.max_cycles));

    let mut out = String::new();
    out.push_str(&format!(
        "{:<40} {:>8} {:>8} {:>16}\n",
        "Function", "Calls", "Threads", "Max cycles"
    ));
    out.push_str(&format!("{}\n", "-".repeat(76)));
    for func in &functions {
        out.push_str(&format!(
            "{:<40} {:>8} {:>8} {:>16}\n",
            func.name,
            func.calls,
            func.thread_count(),
            func.max_cycles
        ));
    }
    out.push_str(&format!(
        "\n{} records, {} functions, {} threads, core switch ratio {:.2}%\n",
        records.len(),
        analysis.module.nfuncs,
        analysis.module.nthreads,
        analysis.module.core_switch_ratio
    ));
    out
}

/// Show the per-function delta between two captures, comparing max cycles.
pub fn diff_captures(a: &[CallRecord], b: &[CallRecord]) -> String {
    let a_funcs = analyze(a, 0, 0).functions;
    let b_funcs = analyze(b, 0, 0).functions;

    // Collect all function names, sorted for deterministic output.
    let mut names: Vec<&str> = a_funcs
        .iter()
        .chain(&b_funcs)
        .map(|f| f.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();

    let max_of = |funcs: &[FunctionSummary], name: &str| -> u64 {
        funcs
            .iter()
            .find(|f| f.name == name)
            .map_or(0, |f| f.max_cycles)
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{:<40} {:>14} {:>14} {:>14}\n",
        "Function", "Before", "After", "Delta"
    ));
    out.push_str(&format!("{}\n", "-".repeat(85)));
    for name in &names {
        let before = max_of(&a_funcs, name) as i128;
        let after = max_of(&b_funcs, name) as i128;
        out.push_str(&format!(
            "{:<40} {:>14} {:>14} {:>+14}\n",
            name,
            before,
            after,
            after - before
        ));
    }
    out
}

/// Find the most recently modified `.csv` capture in a directory.
pub fn latest_capture(dir: &Path) -> Result<PathBuf, Error> {
    let mut best: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in std::fs::read_dir(dir).map_err(|source| Error::CaptureRead {
        path: dir.to_path_buf(),
        source,
    })? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let mtime = entry.metadata()?.modified()?;
        if best.as_ref().map_or(true, |(_, t)| mtime > *t) {
            best = Some((path, mtime));
        }
    }
    best.map(|(p, _)| p)
        .ok_or_else(|| Error::NoCaptures(dir.to_path_buf()))
}
