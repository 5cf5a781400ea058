use std::collections::{HashMap, HashSet};
use std::path::Path;

use aho_corasick::AhoCorasick;

use crate::error::{GuessError, Result};
use crate::io::read_file;

/// Deduplicated set of attacker-supplied hint keywords.
///
/// Loaded once before a run and immutable afterwards. An empty set is
/// valid: every keyword feature of the enumerator becomes a no-op.
///
/// Substring containment is answered by an Aho-Corasick automaton built
/// once over the whole set, so per-cycle matching does not rescan every
/// keyword. Keywords are addressed by their index into `keywords`.
#[derive(Debug)]
pub struct IntelSet {
	keywords: Vec<String>,
	matcher: Option<AhoCorasick>,
}

impl IntelSet {
	/// Builds a set from raw keyword strings.
	///
	/// Entries are trimmed; empty entries and duplicates are dropped.
	/// First-seen order is preserved, so keyword indices are stable for a
	/// fixed input order.
	///
	/// # Errors
	/// Returns `InvalidConfig` if the match automaton cannot be built.
	pub fn new<I, S>(words: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut seen: HashSet<String> = HashSet::new();
		let mut keywords: Vec<String> = Vec::new();
		for word in words {
			let word = word.as_ref().trim();
			if word.is_empty() {
				continue;
			}
			if seen.insert(word.to_owned()) {
				keywords.push(word.to_owned());
			}
		}

		let matcher = if keywords.is_empty() {
			None
		} else {
			Some(
				AhoCorasick::new(&keywords)
					.map_err(|e| GuessError::InvalidConfig(format!("keyword automaton: {e}")))?,
			)
		};

		Ok(Self { keywords, matcher })
	}

	/// Loads keywords from a newline-separated file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::new(read_file(path)?)
	}

	/// An empty set; all keyword features become no-ops.
	pub fn empty() -> Self {
		Self { keywords: Vec::new(), matcher: None }
	}

	pub fn len(&self) -> usize {
		self.keywords.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keywords.is_empty()
	}

	pub fn keywords(&self) -> &[String] {
		&self.keywords
	}

	pub fn keyword(&self, id: usize) -> &str {
		&self.keywords[id]
	}

	/// First keyword fully contained in `body` whose id is not in
	/// `exclude`, if any.
	pub fn first_contained(&self, body: &str, exclude: &HashSet<usize>) -> Option<usize> {
		let matcher = self.matcher.as_ref()?;
		matcher
			.find_overlapping_iter(body)
			.map(|m| m.pattern().as_usize())
			.find(|id| !exclude.contains(id))
	}

	/// Whether `body` contains any keyword at all.
	pub fn contains_any(&self, body: &str) -> bool {
		match &self.matcher {
			Some(matcher) => matcher.is_match(body),
			None => false,
		}
	}

	/// Ids of keywords for which `body` is a strict prefix, i.e. keywords
	/// the candidate could still grow into.
	pub fn prefix_matches<'a>(&'a self, body: &'a str) -> impl Iterator<Item = usize> + 'a {
		self.keywords
			.iter()
			.enumerate()
			.filter(move |(_, kw)| kw.len() > body.len() && kw.starts_with(body))
			.map(|(id, _)| id)
	}
}

/// Mines candidate keywords from a password list.
///
/// Counts, for every lowercased substring of length
/// `min_len..=max_len`, how many distinct passwords contain it (each
/// password contributes at most once per substring), then keeps the
/// substrings reaching `min_occurrence`, most common first.
///
/// Useful for bootstrapping an `IntelSet` from a related leak when no
/// target-specific hints are available. Ties are broken
/// lexicographically so the output is deterministic.
pub fn extract_keywords(
	passwords: &[String],
	min_len: usize,
	max_len: usize,
	min_occurrence: usize,
) -> Vec<(String, usize)> {
	let mut counter: HashMap<String, usize> = HashMap::new();

	for password in passwords {
		let chars: Vec<char> = password.to_lowercase().chars().collect();

		let mut seen: HashSet<String> = HashSet::new();
		for start in 0..chars.len() {
			let max_end = (start + max_len).min(chars.len());
			for end in start + min_len..=max_end {
				seen.insert(chars[start..end].iter().collect());
			}
		}
		for substring in seen {
			*counter.entry(substring).or_insert(0) += 1;
		}
	}

	let mut keywords: Vec<(String, usize)> = counter
		.into_iter()
		.filter(|(_, count)| *count >= min_occurrence)
		.collect();
	keywords.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
	keywords
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write as _;

	#[test]
	fn new_trims_dedups_and_drops_empties() {
		let set = IntelSet::new(["qwerty", "  dragon  ", "", "qwerty", "   "]).unwrap();
		assert_eq!(set.keywords(), &["qwerty".to_owned(), "dragon".to_owned()]);
	}

	#[test]
	fn load_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"qwerty\n\ndragon\nqwerty\n").unwrap();

		let set = IntelSet::load(file.path()).unwrap();
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn empty_set_matches_nothing() {
		let set = IntelSet::empty();
		assert!(!set.contains_any("qwerty123"));
		assert!(set.first_contained("qwerty123", &HashSet::new()).is_none());
		assert_eq!(set.prefix_matches("qw").count(), 0);
	}

	#[test]
	fn first_contained_skips_excluded_ids() {
		let set = IntelSet::new(["qwerty", "erty1"]).unwrap();
		let none = HashSet::new();
		assert_eq!(set.first_contained("qwerty123", &none), Some(0));

		let mut exclude = HashSet::new();
		exclude.insert(0usize);
		assert_eq!(set.first_contained("qwerty123", &exclude), Some(1));

		exclude.insert(1usize);
		assert_eq!(set.first_contained("qwerty123", &exclude), None);
	}

	#[test]
	fn extract_keywords_counts_distinct_passwords() {
		let passwords: Vec<String> = ["love123", "ILOVEyou", "xlovex", "nope"]
			.iter()
			.map(|s| s.to_string())
			.collect();

		let keywords = extract_keywords(&passwords, 4, 4, 2);
		assert_eq!(keywords, vec![("love".to_owned(), 3)]);
	}

	#[test]
	fn extract_keywords_counts_each_password_once() {
		// "abab" contains "ab" twice but contributes a single occurrence
		let passwords: Vec<String> = vec!["abab".to_owned(), "zabz".to_owned()];
		let keywords = extract_keywords(&passwords, 2, 2, 2);
		let ab = keywords.iter().find(|(k, _)| k == "ab").expect("ab mined");
		assert_eq!(ab.1, 2);
	}

	#[test]
	fn prefix_match_is_strict() {
		let set = IntelSet::new(["qwerty", "qw", "dragon"]).unwrap();
		let ids: Vec<usize> = set.prefix_matches("qw").collect();
		// "qw" can still grow into "qwerty" but equals "qw" itself
		assert_eq!(ids, vec![0]);
		// substring but not prefix
		assert_eq!(set.prefix_matches("wer").count(), 0);
	}
}
