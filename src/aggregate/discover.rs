// src/aggregate/discover.rs

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::params::SNAPSHOT_EXT;
use crate::progress::Progress;

/// All non-empty `*.csv` snapshots in `dir`, sorted lexicographically by file
/// name. Filename order must equal capture order; that property belongs to
/// whoever fills the directory. An empty result is valid.
pub fn snapshots(dir: &Path, progress: &mut dyn Progress) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files = Vec::new();
    let mut num_empty = 0usize;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() { continue; }
        if path.extension().and_then(|s| s.to_str()).unwrap_or("") != SNAPSHOT_EXT { continue; }
        if fs::metadata(&path)?.len() == 0 {
            num_empty += 1;
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if num_empty > 0 {
        logf!("Filtered out {} of {} empty snapshot files", num_empty, files.len() + num_empty);
        progress.log(&format!("Filtered out {num_empty} empty snapshot files"));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn filters_empty_and_non_csv_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let mk = |name: &str, body: &str| {
            let mut f = File::create(dir.path().join(name)).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        };
        mk("players-2017-09-02.csv", "name,team,pos\n");
        mk("players-2017-09-01.csv", "name,team,pos\n");
        mk("players-2017-09-03.csv", ""); // zero bytes, dropped
        mk("notes.txt", "not a snapshot");
        mk("players-2017-09-01.csv-player-position-cache.json", "{}");

        let files = snapshots(dir.path(), &mut NullProgress).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["players-2017-09-01.csv", "players-2017-09-02.csv"]);
    }

    #[test]
    fn empty_dir_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(snapshots(dir.path(), &mut NullProgress).unwrap().is_empty());
    }
}
