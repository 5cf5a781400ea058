use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessesToUpdate, System};

/// Injectable resource probe consulted once per expansion cycle.
///
/// Abstracting the wall clock and the resident-memory reading keeps the
/// engine's abort logic testable without real time or memory pressure.
pub trait ResourceProbe {
	/// Time elapsed since the run started.
	fn elapsed(&self) -> Duration;

	/// Resident memory of the process, in bytes.
	fn resident_memory(&mut self) -> u64;
}

/// Probe backed by the OS: monotonic clock plus `sysinfo` resident
/// memory of the current process.
pub struct ProcessProbe {
	started: Instant,
	system: System,
	pid: Pid,
}

impl ProcessProbe {
	/// Starts the clock for the current process.
	pub fn start() -> Self {
		Self {
			started: Instant::now(),
			system: System::new(),
			pid: Pid::from_u32(std::process::id()),
		}
	}
}

impl ResourceProbe for ProcessProbe {
	fn elapsed(&self) -> Duration {
		self.started.elapsed()
	}

	fn resident_memory(&mut self) -> u64 {
		self.system
			.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
		self.system
			.process(self.pid)
			.map(|process| process.memory())
			.unwrap_or(0)
	}
}

/// Probe returning fixed values. Used by tests and by callers that want
/// resource caps to never fire.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
	pub elapsed: Duration,
	pub resident_memory: u64,
}

impl FixedProbe {
	/// A probe that reports zero usage, effectively disabling both caps.
	pub fn idle() -> Self {
		Self { elapsed: Duration::ZERO, resident_memory: 0 }
	}
}

impl ResourceProbe for FixedProbe {
	fn elapsed(&self) -> Duration {
		self.elapsed
	}

	fn resident_memory(&mut self) -> u64 {
		self.resident_memory
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn process_probe_reports_monotonic_elapsed() {
		let probe = ProcessProbe::start();
		let first = probe.elapsed();
		let second = probe.elapsed();
		assert!(second >= first);
	}

	#[test]
	fn fixed_probe_returns_configured_values() {
		let mut probe = FixedProbe { elapsed: Duration::from_secs(5), resident_memory: 1024 };
		assert_eq!(probe.elapsed(), Duration::from_secs(5));
		assert_eq!(probe.resident_memory(), 1024);
	}
}
