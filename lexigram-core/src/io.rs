use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Reads a wordlist file and keeps only valid training words.
///
/// The file is split on whitespace; a word is kept when it is at least
/// 3 characters long and consists solely of lowercase ASCII letters.
/// Everything the filter passes is guaranteed to encode cleanly against
/// the lowercase alphabet.
pub fn load_wordlist<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents
		.split_whitespace()
		.filter(|w| w.len() >= 3 && w.chars().all(|c| c.is_ascii_lowercase()))
		.map(str::to_owned)
		.collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/words.txt` + `"bin"` → `data/words.bin`
pub(crate) fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	if input_path.file_stem().is_none() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"));
	}

	Ok(input_path.with_extension(output_extension))
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/words.txt"` → `"words"`
/// - `"words.txt"` → `"words"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension().is_some_and(|e| e == extension) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn scratch_file(name: &str, contents: &str) -> PathBuf {
		let mut path = std::env::temp_dir();
		path.push(format!("lexigram-io-{}-{}", std::process::id(), name));
		let mut file = File::create(&path).unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		path
	}

	#[test]
	fn wordlist_loading_filters_invalid_training_words() {
		let path = scratch_file("wordlist.txt", "cat Dog ab tree3 tree\nvine  éole\n");
		let words = load_wordlist(&path).unwrap();
		fs::remove_file(&path).unwrap();

		assert_eq!(words, vec!["cat".to_string(), "tree".to_string(), "vine".to_string()]);
	}

	#[test]
	fn output_paths_swap_the_extension_in_place() {
		let output = build_output_path("data/words.txt", "bin").unwrap();
		assert_eq!(output, PathBuf::from("data/words.bin"));
	}

	#[test]
	fn filenames_drop_directories_and_extensions() {
		assert_eq!(get_filename("./data/words.txt").unwrap(), "words");
		assert_eq!(get_filename("words.txt").unwrap(), "words");
	}
}
