use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Reads a whole file into a `String`.
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads a file, mapping "not found" to `None`.
///
/// Every other failure (permissions, is a directory, ...) is returned as is.
pub(crate) fn read_if_exists<P: AsRef<Path>>(filename: P) -> io::Result<Option<Vec<u8>>> {
	match fs::read(filename) {
		Ok(bytes) => Ok(Some(bytes)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e),
	}
}

/// Builds the sibling backup path of a database file.
///
/// Example:
/// `data/chain.txt` → `data/.chain.txt.bak`
pub(crate) fn build_backup_path<P: AsRef<Path>>(input_path: P) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_name = input_path
		.file_name()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut backup_name = String::from(".");
	backup_name.push_str(&file_name.to_string_lossy());
	backup_name.push_str(".bak");

	Ok(parent.join(backup_name))
}

/// Replaces `path` with `bytes` without ever leaving it half written.
///
/// - Writes and syncs the new content to the backup path
/// - Renames the backup over `path` (atomic on the same filesystem)
///
/// If anything fails before the rename, `path` still holds its previous content.
pub(crate) fn write_atomically<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let backup = build_backup_path(path)?;

	let written = File::create(&backup).and_then(|mut file| {
		file.write_all(bytes)?;
		file.flush()?;
		file.sync_all()
	});
	if let Err(e) = written {
		let _ = fs::remove_file(&backup);
		return Err(e);
	}

	fs::rename(&backup, path)
}
