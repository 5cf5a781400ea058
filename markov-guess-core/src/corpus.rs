use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::{GuessError, Result};
use crate::io::read_file;
use crate::model::markov_model::{END_CHAR, START_CHAR};

/// Result of the seeded train/test split of a sampled corpus.
///
/// The test half is listed first to match the sampling layout: the first
/// `number / 2` sampled passwords form the test set, the remainder the
/// training set.
#[derive(Debug)]
pub struct CorpusSplit {
	pub test: Vec<String>,
	pub train: Vec<String>,
}

/// Loads a frequency-annotated password corpus.
///
/// Each line is expected to be `<count> <password>`. The password is
/// repeated `count` times in the returned list so that later sampling and
/// counting are naturally frequency-weighted.
///
/// # Filtering
/// A line is silently skipped when:
/// - it does not split into a count and a password, or the count is not
///   an integer
/// - the password contains a character outside printable ASCII
///   (`0x20..=0x7e`)
/// - the password contains a space
/// - the password is 21 characters or longer
///
/// # Errors
/// Returns `CorpusFormat` if no line at all survives filtering.
pub fn load_annotated_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
	let lines = read_file(&path)?;

	let mut passwords = Vec::new();
	let mut skipped: usize = 0;
	for line in &lines {
		match parse_annotated_line(line) {
			Some((count, password)) => {
				for _ in 0..count {
					passwords.push(password.to_owned());
				}
			}
			None => skipped += 1,
		}
	}

	if passwords.is_empty() {
		return Err(GuessError::CorpusFormat(format!(
			"no valid password line in {} ({} lines skipped)",
			path.as_ref().display(),
			skipped
		)));
	}

	log::debug!("corpus loaded: {} occurrences, {} lines skipped", passwords.len(), skipped);
	Ok(passwords)
}

/// Parses one `<count> <password>` line, applying the corpus filters.
fn parse_annotated_line(line: &str) -> Option<(u64, &str)> {
	let (count, password) = line.trim().split_once(' ')?;
	let count: u64 = count.parse().ok()?;

	if password.is_empty()
		|| password.len() >= 21
		|| password.chars().any(|c| !('\x20'..='\x7e').contains(&c))
		|| password.contains(' ')
	{
		return None;
	}

	Some((count, password))
}

/// Draws a seeded sample of `number` passwords and splits it into test and
/// train halves.
///
/// # Determinism
/// For a fixed corpus, seed and sample count the split is identical across
/// runs (seeded `StdRng`).
///
/// # Errors
/// Returns `InsufficientSample` if `number` exceeds the corpus size.
pub fn split_corpus(passwords: &[String], seed: u64, number: usize) -> Result<CorpusSplit> {
	if number > passwords.len() {
		return Err(GuessError::InsufficientSample {
			requested: number,
			available: passwords.len(),
		});
	}

	let mut rng = StdRng::seed_from_u64(seed);
	let sampled: Vec<String> = rand::seq::index::sample(&mut rng, passwords.len(), number)
		.iter()
		.map(|i| passwords[i].clone())
		.collect();

	let mut test = sampled;
	let train = test.split_off(number / 2);

	Ok(CorpusSplit { test, train })
}

/// Writes one password per line.
pub fn write_wordlist<P: AsRef<Path>>(path: P, words: &[String]) -> Result<()> {
	let mut writer = BufWriter::new(File::create(path)?);
	for word in words {
		writeln!(writer, "{word}")?;
	}
	writer.flush()?;
	Ok(())
}

/// Reads a newline-separated wordlist, dropping empty lines.
pub fn read_wordlist<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
	Ok(read_file(path)?
		.into_iter()
		.filter(|line| !line.trim().is_empty())
		.collect())
}

/// Tallies training passwords into an annotated multiset.
///
/// Each password is wrapped in the model sentinels (`order` start symbols
/// in front, the terminator behind) and counted. The first-seen order of
/// distinct passwords is preserved so that downstream frequency counting
/// is deterministic.
pub fn tally_train(words: &[String], order: usize) -> Vec<(String, u64)> {
	let start: String = START_CHAR.to_string().repeat(order);

	let mut index: HashMap<String, usize> = HashMap::new();
	let mut tallied: Vec<(String, u64)> = Vec::new();
	for word in words {
		let mut annotated = String::with_capacity(order + word.len() + 1);
		annotated.push_str(&start);
		annotated.push_str(word);
		annotated.push(END_CHAR);

		match index.get(&annotated) {
			Some(&i) => tallied[i].1 += 1,
			None => {
				index.insert(annotated.clone(), tallied.len());
				tallied.push((annotated, 1));
			}
		}
	}
	tallied
}

/// Tallies ground-truth passwords into a multiset of remaining counts.
///
/// The enumerator consumes this map destructively: callers wanting
/// post-run totals must snapshot it first.
pub fn tally_ground_truth(words: &[String]) -> HashMap<String, u64> {
	let mut counts: HashMap<String, u64> = HashMap::new();
	for word in words {
		*counts.entry(word.clone()).or_insert(0) += 1;
	}
	counts
}
