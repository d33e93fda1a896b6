//! Call-capture profiling runtime.
//!
//! Linked into a target binary whose function entry/exit sites have been
//! instrumented by an external pass. Each instrumented invocation calls
//! [`Profiler::record_call`] with the cycle count and core ids it measured
//! (see [`tsc`] and [`sys`] for the reads). After all writer threads have
//! been joined, the embedder runs [`Profiler::analyze`] once and emits the
//! reports.
//!
//! Constructing a [`Profiler`] replaces the reference implementation's
//! load-time initialization; dropping it is finalization. All state lives in
//! the value -- there are no process-wide globals.
//!
//! ```
//! use rdtsc_runtime::Profiler;
//!
//! let profiler = Profiler::with_capacity(64);
//! profiler.record_call(1, 1, 0, 0, 120, "parse")?;
//! profiler.record_call(1, 2, 0, 1, 300, "parse")?;
//!
//! let mut profiler = profiler;
//! let n = profiler.populated();
//! profiler.analyze(n)?;
//! assert_eq!(profiler.analysis().functions[0].calls, 2);
//! # Ok::<(), rdtsc_runtime::Error>(())
//! ```

mod aggregate;
mod error;
mod record;
pub mod report;
mod store;
pub mod sys;
pub mod tsc;

pub use aggregate::{analyze, Analysis, FunctionSummary, ModuleSummary};
pub use error::Error;
pub use record::{CallRecord, FuncName, NAME_CAPACITY};
pub use store::{RecordStore, Slot, CAPTURE_LIMIT};

/// Process-wide profiling state: the record store plus the summaries built
/// from it.
///
/// The capture phase needs only `&Profiler`, so the value can be shared
/// across writer threads (e.g. behind an `Arc` or a scoped borrow).
/// Analysis and report writing take `&mut Profiler`; obtaining that borrow
/// requires the writers to be gone, which is the quiescence contract the
/// aggregation pass depends on.
pub struct Profiler {
    store: RecordStore,
    nprocs: u64,
    nprocs_avail: u64,
    analysis: Analysis,
}

impl Profiler {
    /// Allocate a profiler with the default [`CAPTURE_LIMIT`] record store.
    pub fn new() -> Self {
        Self::with_capacity(CAPTURE_LIMIT)
    }

    /// Allocate a profiler with a custom record capacity. Capacity is fixed
    /// for the life of the value; the store is never resized.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: RecordStore::with_capacity(capacity),
            nprocs: sys::logical_processor_count(),
            nprocs_avail: sys::available_processor_count(),
            analysis: Analysis::default(),
        }
    }

    /// Record one captured call: claim a slot and store the record in it.
    ///
    /// Returns the slot index. Fails with [`Error::CaptureLimitReached`]
    /// when the store is full; the caller decides whether to drop the record
    /// or treat that as fatal. Never blocks.
    pub fn record_call(
        &self,
        pid: u64,
        tid: u64,
        core_start: u64,
        core_end: u64,
        cycles: u64,
        name: &str,
    ) -> Result<u64, Error> {
        let slot = self.store.allocate_slot()?;
        let index = slot.index();
        slot.store(CallRecord {
            pid,
            tid,
            core_start,
            core_end,
            cycles,
            name: FuncName::new(name),
        });
        Ok(index)
    }

    /// Number of records captured so far. This is the `n` the embedder
    /// passes to [`analyze`](Self::analyze) and the raw report writers.
    pub fn populated(&self) -> u64 {
        self.store.populated()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The first `n` captured records, in slot order.
    pub fn records(&mut self, n: u64) -> Result<&[CallRecord], Error> {
        self.store.records(n)
    }

    /// Rebuild the function and module summaries from the first `n` records.
    ///
    /// Discards any previous summaries; repeated calls over an unchanged
    /// store are idempotent. Passing `n` greater than
    /// [`populated`](Self::populated) aggregates zeroed filler records --
    /// the embedder must pass the true count.
    pub fn analyze(&mut self, n: u64) -> Result<(), Error> {
        let nprocs = self.nprocs;
        let nprocs_avail = self.nprocs_avail;
        let records = self.store.records(n)?;
        self.analysis = aggregate::analyze(records, nprocs, nprocs_avail);
        Ok(())
    }

    /// Summaries built by the last [`analyze`](Self::analyze) pass.
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Write the fixed-width raw dump of the first `n` records to
    /// [`report::RAW_REPORT_PATH`].
    pub fn write_raw_text(&mut self, n: u64) -> Result<(), Error> {
        let records = self.store.records(n)?;
        report::write_raw_text(records)
    }

    /// Write the CSV dump of the first `n` records to
    /// [`report::CSV_REPORT_PATH`].
    pub fn write_raw_csv(&mut self, n: u64) -> Result<(), Error> {
        let records = self.store.records(n)?;
        report::write_raw_csv(records)
    }

    /// Print the per-function summary table to stdout.
    pub fn write_function_summary(&self) -> Result<(), Error> {
        report::write_function_summary(&self.analysis.functions)
    }

    /// Print the module summary to stdout.
    pub fn write_module_summary(&self) -> Result<(), Error> {
        report::write_module_summary(&self.analysis.module)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
