//! Single-pass aggregation of raw call records into per-function and
//! module-wide summaries.

use std::collections::{HashMap, HashSet};

use crate::record::CallRecord;

/// Aggregated data for one distinct function name.
#[derive(Debug, Clone)]
pub struct FunctionSummary {
    pub name: String,
    pub calls: u64,
    pub max_cycles: u64,
    threads: HashSet<u64>,
}

impl FunctionSummary {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            calls: 0,
            max_cycles: 0,
            threads: HashSet::new(),
        }
    }

    /// Number of distinct threads that called this function.
    pub fn thread_count(&self) -> u64 {
        self.threads.len() as u64
    }
}

/// Process-wide aggregate, rebuilt wholesale by each [`analyze`] pass.
#[derive(Debug, Clone, Default)]
pub struct ModuleSummary {
    pub nprocs: u64,
    pub nprocs_avail: u64,
    pub nthreads: u64,
    pub nfuncs: u64,
    /// Fraction of captured calls whose start and end core differ; 0 when no
    /// records were analyzed.
    pub core_switch_ratio: f64,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Per-function summaries, in the order each name was first encountered.
    /// The summary report preserves this order; downstream consumers may
    /// depend on it.
    pub functions: Vec<FunctionSummary>,
    pub module: ModuleSummary,
}

/// Scan `records` once and build fresh summaries.
///
/// Repeated calls over an unchanged slice produce identical output. The
/// processor counts are passed through into the module summary untouched.
pub fn analyze(records: &[CallRecord], nprocs: u64, nprocs_avail: u64) -> Analysis {
    let mut functions: Vec<FunctionSummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut module_threads: HashSet<u64> = HashSet::new();
    let mut core_switches = 0u64;

    for rec in records {
        module_threads.insert(rec.tid);

        let i = match index.get(rec.name.as_str()) {
            Some(&i) => i,
            None => {
                let i = functions.len();
                index.insert(rec.name.as_str().to_owned(), i);
                functions.push(FunctionSummary::new(rec.name.as_str()));
                i
            }
        };
        let func = &mut functions[i];
        func.calls += 1;
        func.threads.insert(rec.tid);
        func.max_cycles = func.max_cycles.max(rec.cycles);

        if rec.core_switched() {
            core_switches += 1;
        }
    }

    let core_switch_ratio = if records.is_empty() {
        0.0
    } else {
        core_switches as f64 / records.len() as f64
    };

    Analysis {
        module: ModuleSummary {
            nprocs,
            nprocs_avail,
            nthreads: module_threads.len() as u64,
            nfuncs: functions.len() as u64,
            core_switch_ratio,
        },
        functions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FuncName;

    fn rec(name: &str, tid: u64, cycles: u64, cores: (u64, u64)) -> CallRecord {
        CallRecord {
            pid: 1,
            tid,
            core_start: cores.0,
            core_end: cores.1,
            cycles,
            name: FuncName::new(name),
        }
    }

    #[test]
    fn core_switch_ratio_counts_migrated_calls() {
        let records = [
            rec("f", 1, 10, (0, 0)),
            rec("f", 1, 10, (0, 1)),
            rec("f", 1, 10, (1, 1)),
            rec("f", 1, 10, (2, 0)),
        ];
        let analysis = analyze(&records, 8, 8);
        assert!((analysis.module.core_switch_ratio - 0.5).abs() < f64::EPSILON);
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.functions[0].calls, 4);
    }

    #[test]
    fn max_cycles_and_calls_per_function() {
        let records = [
            rec("f", 1, 10, (0, 0)),
            rec("g", 1, 5, (0, 0)),
            rec("f", 1, 30, (0, 0)),
            rec("f", 1, 20, (0, 0)),
        ];
        let analysis = analyze(&records, 4, 4);
        let f = analysis.functions.iter().find(|s| s.name == "f").unwrap();
        let g = analysis.functions.iter().find(|s| s.name == "g").unwrap();
        assert_eq!((f.calls, f.max_cycles), (3, 30));
        assert_eq!((g.calls, g.max_cycles), (1, 5));
    }

    #[test]
    fn functions_keep_first_seen_order() {
        let records = [
            rec("outer", 1, 1, (0, 0)),
            rec("inner", 1, 1, (0, 0)),
            rec("outer", 1, 1, (0, 0)),
            rec("leaf", 1, 1, (0, 0)),
            rec("inner", 1, 1, (0, 0)),
        ];
        let analysis = analyze(&records, 4, 4);
        let names: Vec<&str> = analysis.functions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["outer", "inner", "leaf"]);
    }

    #[test]
    fn distinct_threads_counted_per_function_and_module() {
        let records = [
            rec("f", 10, 1, (0, 0)),
            rec("f", 11, 1, (0, 0)),
            rec("f", 10, 1, (0, 0)),
            rec("g", 12, 1, (0, 0)),
        ];
        let analysis = analyze(&records, 4, 4);
        assert_eq!(analysis.module.nthreads, 3);
        assert_eq!(analysis.module.nfuncs, 2);
        let f = analysis.functions.iter().find(|s| s.name == "f").unwrap();
        assert_eq!(f.thread_count(), 2);
    }

    #[test]
    fn analysis_is_idempotent_over_a_fixed_slice() {
        let records = [
            rec("a", 1, 100, (0, 1)),
            rec("b", 2, 50, (1, 1)),
            rec("a", 2, 70, (2, 2)),
        ];
        let first = analyze(&records, 2, 2);
        let second = analyze(&records, 2, 2);
        assert_eq!(first.module.nthreads, second.module.nthreads);
        assert_eq!(first.module.nfuncs, second.module.nfuncs);
        assert_eq!(
            first.module.core_switch_ratio.to_bits(),
            second.module.core_switch_ratio.to_bits()
        );
        assert_eq!(first.functions.len(), second.functions.len());
        for (a, b) in first.functions.iter().zip(&second.functions) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.calls, b.calls);
            assert_eq!(a.max_cycles, b.max_cycles);
            assert_eq!(a.thread_count(), b.thread_count());
        }
    }

    #[test]
    fn empty_input_yields_zero_ratio() {
        let analysis = analyze(&[], 4, 2);
        assert_eq!(analysis.module.nthreads, 0);
        assert_eq!(analysis.module.nfuncs, 0);
        assert_eq!(analysis.module.core_switch_ratio, 0.0);
        assert_eq!(analysis.module.nprocs, 4);
        assert_eq!(analysis.module.nprocs_avail, 2);
    }
}
