use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Append-only destination for emitted guesses.
///
/// The enumerator calls `append` synchronously for every emitted guess;
/// persistence concerns live behind this trait, not in the engine.
/// An append failure is fatal to the run.
pub trait GuessSink {
	fn append(&mut self, password: &str, probability: f64) -> io::Result<()>;
}

/// In-memory sink collecting `(password, probability)` records.
#[derive(Debug, Default)]
pub struct MemorySink {
	records: Vec<(String, f64)>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn records(&self) -> &[(String, f64)] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

impl GuessSink for MemorySink {
	fn append(&mut self, password: &str, probability: f64) -> io::Result<()> {
		self.records.push((password.to_owned(), probability));
		Ok(())
	}
}

/// Write mode of a `FileSink`.
///
/// `Truncate` rewrites the file on every record and therefore only ever
/// holds the latest guess; it exists for debugging and should not be
/// used for real runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
	Append,
	Truncate,
}

/// File-backed sink writing `password<TAB>probability` lines.
#[derive(Debug)]
pub struct FileSink {
	file: File,
	mode: SinkMode,
}

impl FileSink {
	/// Creates (or truncates) the output file.
	pub fn create<P: AsRef<Path>>(path: P, mode: SinkMode) -> io::Result<Self> {
		let file = OpenOptions::new()
			.create(true)
			.write(true)
			.truncate(true)
			.open(path)?;
		Ok(Self { file, mode })
	}
}

impl GuessSink for FileSink {
	fn append(&mut self, password: &str, probability: f64) -> io::Result<()> {
		if self.mode == SinkMode::Truncate {
			self.file.set_len(0)?;
			self.file.seek(SeekFrom::Start(0))?;
		}
		writeln!(self.file, "{password}\t{probability}")
	}
}
