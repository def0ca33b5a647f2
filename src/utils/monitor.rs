use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Wall time of one pipeline phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTiming {
    pub phase: String,
    pub elapsed: Duration,
    pub memory_mb: Option<u64>,
}

/// Tracks phase durations for a run and, with the `cli` feature, process memory.
pub struct RunMonitor {
    enabled: bool,
    started: Instant,
    phase_started: Instant,
    phases: Vec<PhaseTiming>,
    peak_memory_mb: u64,
    #[cfg(feature = "cli")]
    system: Option<(System, Pid)>,
}

impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            started: now,
            phase_started: now,
            phases: Vec::new(),
            peak_memory_mb: 0,
            #[cfg(feature = "cli")]
            system: if enabled {
                sysinfo::get_current_pid()
                    .ok()
                    .map(|pid| (System::new(), pid))
            } else {
                None
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start_phase(&mut self) {
        self.phase_started = Instant::now();
    }

    /// Closes the current phase and logs it when monitoring is on.
    pub fn end_phase(&mut self, phase: &str) {
        let elapsed = self.phase_started.elapsed();
        let memory_mb = self.sample_memory_mb();

        if let Some(mb) = memory_mb {
            self.peak_memory_mb = self.peak_memory_mb.max(mb);
        }

        if self.enabled {
            match memory_mb {
                Some(mb) => tracing::info!("📊 {} took {:?}, memory {}MB", phase, elapsed, mb),
                None => tracing::info!("📊 {} took {:?}", phase, elapsed),
            }
        }

        self.phases.push(PhaseTiming {
            phase: phase.to_string(),
            elapsed,
            memory_mb,
        });
        self.phase_started = Instant::now();
    }

    pub fn phases(&self) -> &[PhaseTiming] {
        &self.phases
    }

    pub fn total_elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        if self.peak_memory_mb > 0 {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                self.total_elapsed(),
                self.peak_memory_mb
            );
        } else {
            tracing::info!("📊 Final Stats - Total Time: {:?}", self.total_elapsed());
        }
    }

    #[cfg(feature = "cli")]
    fn sample_memory_mb(&mut self) -> Option<u64> {
        let (system, pid) = self.system.as_mut()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[*pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system.process(*pid).map(|p| p.memory() / 1024 / 1024)
    }

    #[cfg(not(feature = "cli"))]
    fn sample_memory_mb(&mut self) -> Option<u64> {
        None
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
