use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::io;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds the cache path of a trained model artifact.
///
/// The artifact is keyed by context order, random seed and sample count so
/// that distinct training runs never collide.
///
/// Example:
/// `("cache", 3, 2, 2000000)` → `cache/order3/order3_2_2000000.bin`
pub(crate) fn model_cache_path<P: AsRef<Path>>(base: P, order: usize, seed: u64, number: usize) -> PathBuf {
	let mut path = PathBuf::from(base.as_ref());
	path.push(format!("order{order}"));
	path.push(format!("order{order}_{seed}_{number}.bin"));
	path
}
