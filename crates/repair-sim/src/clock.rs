//! Wall and CPU timing for individual trials
//!
//! CPU time is read from the calling thread's CPU clock. A trial runs start to
//! finish on one worker thread, so the difference of two readings is the CPU
//! time spent in that trial alone.

#![allow(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Elapsed time of one trial
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Wall-clock time
    pub wall: Duration,
    /// CPU time of the executing thread; equals `wall` where no CPU clock exists
    pub cpu: Duration,
}

/// Running stopwatch started at the beginning of a trial
#[derive(Debug, Clone, Copy)]
pub struct TrialClock {
    wall: Instant,
    cpu: Option<Duration>,
}

impl TrialClock {
    /// Start both clocks
    pub fn start() -> Self {
        Self {
            cpu: thread_cpu_time(),
            wall: Instant::now(),
        }
    }

    /// Read elapsed wall and CPU time
    pub fn stop(self) -> Timing {
        let wall = self.wall.elapsed();
        let cpu = match (self.cpu, thread_cpu_time()) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => wall,
        };
        Timing { wall, cpu }
    }
}

/// CPU time consumed so far by the current thread
#[cfg(unix)]
pub fn thread_cpu_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    let secs = u64::try_from(ts.tv_sec).ok()?;
    let nanos = u32::try_from(ts.tv_nsec).ok()?;
    Some(Duration::new(secs, nanos))
}

/// CPU time consumed so far by the current thread
#[cfg(not(unix))]
pub fn thread_cpu_time() -> Option<Duration> {
    None
}
