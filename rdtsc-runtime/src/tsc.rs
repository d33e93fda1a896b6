//! Hardware timestamp reads (TSC on x86_64).
//!
//! `read_cycles()` returns raw counter ticks. `read_cycles_and_core()`
//! additionally returns the logical processor id sampled in the same
//! instruction, with a full fence in front so that instrumented work
//! cannot be reordered across the timing boundary by the executing core.
//! Without the fence, concurrently measured elapsed times may include or
//! exclude neighboring work nondeterministically.

/// Read the cycle counter. Single inline instruction on x86_64 (`rdtsc`).
#[inline(always)]
pub fn read_cycles() -> u64 {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::x86_64::_rdtsc()
    }
    // Fallback: nanoseconds since an arbitrary epoch via Instant. Loses the
    // sub-microsecond resolution but keeps the runtime usable off x86_64.
    #[cfg(not(target_arch = "x86_64"))]
    {
        fallback_ns()
    }
}

/// Read the cycle counter and the id of the logical processor executing the
/// read, as one serialized operation (`mfence; rdtscp`).
#[inline(always)]
pub fn read_cycles_and_core() -> (u64, u64) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::x86_64::_mm_mfence();
        let mut aux: u32 = 0;
        let cycles = core::arch::x86_64::__rdtscp(&mut aux);
        (cycles, u64::from(aux))
    }
    // No processor-id register on the fallback path; report core 0.
    #[cfg(not(target_arch = "x86_64"))]
    {
        (fallback_ns(), 0)
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn fallback_ns() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    Instant::now().duration_since(*epoch).as_nanos() as u64
}
