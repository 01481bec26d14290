use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use tempfile::NamedTempFile;

use crate::error::MarkovError;
use crate::model::fragment::Structure;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Training sentences found in `lines`: each line trimmed, blank lines dropped.
///
/// Shared by file loading and the HTTP training endpoint so both train alike.
pub fn sentences<'a, I: IntoIterator<Item = &'a str>>(lines: I) -> Vec<&'a str> {
	lines.into_iter().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Builds an output path based on an input path and a new extension.
///
/// The extension is appended to the full stem, dots included.
///
/// Examples:
/// - `data/input.dat` + `"2.bin"` → `data/input.2.bin`
/// - `data/fr.cheese.dat` + `"2.bin"` → `data/fr.cheese.2.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(format!("{}.{}", file_stem.to_string_lossy(), output_extension));

	Ok(output)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/model.dat"` → `"model"`
/// - `"model.dat"` → `"model"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Writes a model snapshot to `path` using `postcard`.
///
/// The bytes go to a temporary file in the same folder which is then renamed,
/// so a crash never leaves a truncated snapshot behind.
pub fn save_structure<P: AsRef<Path>>(path: P, structure: &Structure) -> Result<(), MarkovError> {
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};

	let bytes = postcard::to_stdvec(structure)?;
	let mut temp_file = NamedTempFile::new_in(parent)?;
	temp_file.write_all(&bytes)?;
	temp_file.persist(path).map_err(|e| e.error)?;
	Ok(())
}

/// Reads a model snapshot written by `save_structure`.
pub fn load_structure<P: AsRef<Path>>(path: P) -> Result<Structure, MarkovError> {
	let bytes = fs::read(path)?;
	Ok(postcard::from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::fragment::Fragment;
	use tempfile::TempDir;

	#[test]
	fn output_path_replaces_extension() {
		let path = build_output_path("data/french.dat", "2.bin").unwrap();
		assert_eq!(path, PathBuf::from("data/french.2.bin"));
	}

	#[test]
	fn output_path_keeps_dotted_stems() {
		let cheese = build_output_path("data/fr.cheese.dat", "2.bin").unwrap();
		let cities = build_output_path("data/fr.cities.dat", "2.bin").unwrap();
		assert_eq!(cheese, PathBuf::from("data/fr.cheese.2.bin"));
		assert_eq!(cities, PathBuf::from("data/fr.cities.2.bin"));

		assert_eq!(build_output_path("data/lorem.2.dat", "2.bin").unwrap(), PathBuf::from("data/lorem.2.2.bin"));
		assert_ne!(
			build_output_path("data/lorem.2.dat", "2.bin").unwrap(),
			build_output_path("data/lorem.dat", "2.bin").unwrap()
		);
	}

	#[test]
	fn filename_strips_folder_and_extension() {
		assert_eq!(get_filename("./data/model.dat").unwrap(), "model");
		assert_eq!(get_filename("model.dat").unwrap(), "model");
	}

	#[test]
	fn lists_only_matching_files() {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join("b.dat"), "x").unwrap();
		fs::write(tmp.path().join("a.dat"), "x").unwrap();
		fs::write(tmp.path().join("a.2.bin"), "x").unwrap();
		fs::create_dir(tmp.path().join("nested.dat")).unwrap();

		assert_eq!(list_files(tmp.path(), "dat").unwrap(), vec!["a.dat", "b.dat"]);
	}

	#[test]
	fn read_file_splits_lines() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("corpus.dat");
		fs::write(&path, "first line\r\nsecond line\n").unwrap();

		assert_eq!(read_file(&path).unwrap(), vec!["first line", "second line"]);
	}

	#[test]
	fn sentences_are_trimmed_and_non_blank() {
		let text = "  a b c d \n\n\t\ne f g h\r\n";
		assert_eq!(sentences(text.lines()), vec!["a b c d", "e f g h"]);
	}

	#[test]
	fn snapshot_survives_disk() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("model.bin");

		let mut structure = Structure::default();
		structure.start_words.push(Fragment::new("a b", "a b c d"));
		structure.end_words.push(Fragment::new("c d", "a b c d"));
		structure.corpus.insert("a b".to_owned(), vec![Fragment::new("c d", "a b c d")]);

		save_structure(&path, &structure).unwrap();
		assert_eq!(load_structure(&path).unwrap(), structure);

		// Overwrites in place, no temporary file left over
		save_structure(&path, &Structure::default()).unwrap();
		assert_eq!(load_structure(&path).unwrap(), Structure::default());
		assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
	}

	#[test]
	fn corrupted_snapshot_is_an_error() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("model.bin");
		fs::write(&path, [0xff, 0xff, 0xff]).unwrap();

		assert!(matches!(load_structure(&path), Err(MarkovError::Snapshot(_))));
	}
}
