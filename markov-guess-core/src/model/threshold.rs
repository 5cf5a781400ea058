use crate::error::{GuessError, Result};

/// Monotonically shrinking sequence of acceptance-probability floors.
///
/// The schedule paces how aggressively the search frontier may grow:
/// `floors[0] = 1/n` keeps the initial frontier small, and each later
/// floor divides the previous one by `max(2, 1.5·n/m)`, letting the
/// search reach deeper, lower-probability candidates once the cheap
/// high-probability guesses are exhausted.
///
/// The active floor is selected by `confirmed_hits / batch_size`,
/// clamped to the last floor once the schedule is exhausted.
#[derive(Debug, Clone)]
pub struct ThresholdSchedule {
	floors: Vec<f64>,
	batch_size: u64,
}

impl ThresholdSchedule {
	/// Computes the schedule for a target of `target_guesses` (`n`)
	/// confirmed guesses, bucketed by `batch_size` (`m`).
	///
	/// # Errors
	/// Returns `InvalidConfig` if either parameter is zero.
	pub fn new(target_guesses: u64, batch_size: u64) -> Result<Self> {
		if target_guesses == 0 {
			return Err(GuessError::InvalidConfig("target guess count must be > 0".to_owned()));
		}
		if batch_size == 0 {
			return Err(GuessError::InvalidConfig("batch size must be > 0".to_owned()));
		}

		let n = target_guesses as f64;
		let m = batch_size as f64;
		let divisor = (1.5 * n / m).max(2.0);

		let mut floor = 1.0 / n;
		let mut floors = vec![floor];
		for _ in 0..target_guesses / batch_size {
			floor /= divisor;
			floors.push(floor);
		}

		Ok(Self { floors, batch_size })
	}

	/// The strictest floor, active before any confirmed hit.
	pub fn initial_floor(&self) -> f64 {
		self.floors[0]
	}

	/// The floor active after `confirmed_hits` confirmed guesses.
	pub fn floor_for(&self, confirmed_hits: u64) -> f64 {
		let index = (confirmed_hits / self.batch_size) as usize;
		self.floors[index.min(self.floors.len() - 1)]
	}

	pub fn len(&self) -> usize {
		self.floors.len()
	}

	pub fn is_empty(&self) -> bool {
		false // always holds at least floors[0]
	}
}
