//! OS process/thread identity and processor counts, queried at call time.
//!
//! These are the values the instrumentation layer passes into
//! [`Profiler::record_call`](crate::Profiler::record_call). None of them can
//! fail; the libc calls involved only read kernel-maintained state.

/// Current process id.
pub fn pid() -> u64 {
    // SAFETY: getpid has no preconditions and cannot fail.
    unsafe { libc::getpid() as u64 }
}

/// OS-level id of the calling thread (not a language-level thread handle).
#[cfg(target_os = "linux")]
pub fn tid() -> u64 {
    // SAFETY: gettid has no preconditions and cannot fail.
    unsafe { libc::gettid() as u64 }
}

#[cfg(target_os = "macos")]
pub fn tid() -> u64 {
    let mut id: u64 = 0;
    // SAFETY: pthread_self() is always a valid handle for the calling thread.
    unsafe { libc::pthread_threadid_np(libc::pthread_self(), &mut id) };
    id
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn tid() -> u64 {
    // No portable OS thread id here; the pid at least stays distinct per process.
    pid()
}

/// Total number of logical processors on the machine.
pub fn logical_processor_count() -> u64 {
    // SAFETY: sysconf with a valid name has no other preconditions.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n > 0 {
        n as u64
    } else {
        1
    }
}

/// Number of logical processors the process may run on under its current
/// affinity mask. Always <= [`logical_processor_count`] on Linux.
#[cfg(target_os = "linux")]
pub fn available_processor_count() -> u64 {
    // SAFETY: zeroed cpu_set_t is a valid output buffer for the calling process.
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set) == 0 {
            libc::CPU_COUNT(&set) as u64
        } else {
            logical_processor_count()
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn available_processor_count() -> u64 {
    logical_processor_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_matches_std() {
        assert_eq!(pid(), std::process::id() as u64);
    }

    #[test]
    fn tid_is_stable_within_a_thread() {
        assert_eq!(tid(), tid());
    }

    #[test]
    fn tids_differ_across_threads() {
        let here = tid();
        let there = std::thread::spawn(tid).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn processor_counts_are_consistent() {
        let total = logical_processor_count();
        let avail = available_processor_count();
        assert!(total >= 1);
        assert!(avail >= 1);
        assert!(avail <= total, "available {avail} > total {total}");
    }
}
