//! Input discovery and output path derivation

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineResult;

/// Regular files in `dir` (not recursive) whose extension equals `extension`,
/// compared case-insensitively, sorted by path.
pub fn discover_inputs(dir: &Path, extension: &str) -> PipelineResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        // follows symlinks
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// `<output_dir>/<input stem>.csv`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    // push rather than set_extension: stems may contain dots
    let mut name = stem.to_os_string();
    name.push(".csv");
    output_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn finds_matching_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.mat", "a.MAT", "notes.txt", "c.mat.bak"] {
            File::create(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("sub.mat")).unwrap();

        let found = discover_inputs(dir.path(), "mat").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MAT", "b.mat"]);
    }

    #[cfg(unix)]
    #[test]
    fn follows_symlinked_recordings() {
        let store = tempdir().unwrap();
        let target = store.path().join("mouse_01.mat");
        File::create(&target).unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("linked.mat")).unwrap();
        std::os::unix::fs::symlink(store.path().join("gone.mat"), dir.path().join("dangling.mat"))
            .unwrap();

        let found = discover_inputs(dir.path(), "mat").unwrap();
        assert_eq!(found, vec![dir.path().join("linked.mat")]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(discover_inputs(Path::new("/no/such/input/dir"), "mat").is_err());
    }

    #[test]
    fn output_path_replaces_extension() {
        let out = output_path_for(Path::new("/data/in/mouse_07.day2.mat"), Path::new("/data/out"));
        assert_eq!(out, PathBuf::from("/data/out/mouse_07.day2.csv"));
    }
}
