// src/aggregate/index.rs

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::aggregate::identity::PlayerKey;
use crate::aggregate::reader::PositionReader;
use crate::params::{INDEX_SUFFIX, NAME_MARKER, PLACEHOLDER};

/// Sidecar path for a snapshot's position index.
pub fn index_path(snapshot: &Path) -> PathBuf {
    let mut s = snapshot.as_os_str().to_os_string();
    s.push(INDEX_SUFFIX);
    PathBuf::from(s)
}

/// Load a snapshot's position index; `None` on any failure (missing file,
/// malformed JSON). Absence only costs a linear scan per lookup. A stale
/// index (snapshot rewritten after indexing) is not detected.
pub fn load(snapshot: &Path) -> Option<HashMap<String, u64>> {
    let file = File::open(index_path(snapshot)).ok()?;
    serde_json::from_reader(BufReader::new(file)).ok()
}

pub fn save(snapshot: &Path, positions: &HashMap<String, u64>) -> Result<(), Box<dyn Error>> {
    let file = File::create(index_path(snapshot))?;
    serde_json::to_writer(BufWriter::new(file), positions)?;
    Ok(())
}

/* ---------------- Per-snapshot lookup ---------------- */

/// One open snapshot plus its position index, loaded eagerly at open.
pub struct SnapshotLookup {
    reader: PositionReader,
    index: Option<HashMap<String, u64>>,
}

impl SnapshotLookup {
    pub fn open(snapshot: &Path) -> Result<Self, Box<dyn Error>> {
        let reader = PositionReader::open(snapshot)?;
        let index = load(snapshot);
        if index.is_none() {
            logf!("No position index for `{}`, using full scans", snapshot.display());
        }
        Ok(Self { reader, index })
    }

    pub fn header(&self) -> &[String] {
        self.reader.header()
    }

    pub fn field<'a>(&self, fields: &'a [String], name: &str) -> Option<&'a str> {
        self.reader.field(fields, name)
    }

    /// The player's full record: an O(1) seek when the index knows the key,
    /// a linear scan when there is no index at all. An index that exists is
    /// authoritative, so a key it lacks is a miss without a scan fallback.
    pub fn find(&mut self, key: &PlayerKey) -> Result<Option<Vec<String>>, Box<dyn Error>> {
        let hit = match &self.index {
            Some(ix) => match ix.get(&key.cache_str()) {
                Some(&offset) => Some(offset),
                None => {
                    logd!("Player not in position index: {}", key);
                    return Ok(None);
                }
            },
            None => None,
        };
        match hit {
            Some(offset) => Ok(self.reader.row_at(offset)?),
            None => self.scan(key),
        }
    }

    fn scan(&mut self, key: &PlayerKey) -> Result<Option<Vec<String>>, Box<dyn Error>> {
        self.reader.rewind()?;
        while let Some((_, fields)) = self.reader.next_row()? {
            let name = self.reader.field(&fields, "name").unwrap_or("");
            if name.replace(NAME_MARKER, "") != key.name { continue; }
            if self.reader.field(&fields, "team").unwrap_or("") != key.team { continue; }
            if self.reader.field(&fields, "pos").unwrap_or("") != key.pos { continue; }
            return Ok(Some(fields));
        }
        Ok(None)
    }

    /// One column of the player's record. An absent player, an absent
    /// column, and the site's placeholder all come back as empty string.
    pub fn value(&mut self, key: &PlayerKey, column: &str) -> Result<String, Box<dyn Error>> {
        let Some(fields) = self.find(key)? else {
            return Ok(s!());
        };
        match self.field(&fields, column) {
            Some(v) if v != PLACEHOLDER => Ok(s!(v)),
            _ => Ok(s!()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    fn build_index(path: &Path) {
        let mut reader = PositionReader::open(path).unwrap();
        let mut positions = HashMap::new();
        while let Some((offset, fields)) = reader.next_row().unwrap() {
            let key = PlayerKey::new(
                reader.field(&fields, "name").unwrap(),
                reader.field(&fields, "team").unwrap(),
                reader.field(&fields, "pos").unwrap(),
            );
            positions.insert(key.cache_str(), offset);
        }
        save(path, &positions).unwrap();
    }

    #[test]
    fn index_path_appends_suffix() {
        let p = index_path(Path::new("data/players-x.csv"));
        assert_eq!(
            p.to_str().unwrap(),
            "data/players-x.csv-player-position-cache.json"
        );
    }

    #[test]
    fn load_missing_or_corrupt_is_none() {
        let f = snapshot("name,team,pos\nAlice,NE,QB\n");
        assert!(load(f.path()).is_none());
        std::fs::write(index_path(f.path()), "not json").unwrap();
        assert!(load(f.path()).is_none());
        std::fs::remove_file(index_path(f.path())).unwrap();
    }

    #[test]
    fn indexed_find_seeks_to_the_right_record() {
        let f = snapshot("name,team,pos,proj\nAlice,NE,QB,17.2\nBob*,GB,WR,4.0\n");
        build_index(f.path());

        let mut lookup = SnapshotLookup::open(f.path()).unwrap();
        let bob = PlayerKey::new("Bob", "GB", "WR");
        let fields = lookup.find(&bob).unwrap().unwrap();
        assert_eq!(lookup.field(&fields, "proj"), Some("4.0"));
        assert_eq!(lookup.field(&fields, "name"), Some("Bob*"));

        std::fs::remove_file(index_path(f.path())).unwrap();
    }

    #[test]
    fn scan_fallback_matches_marked_names() {
        let f = snapshot("name,team,pos,proj\nAlice*,NE,QB,17.2\n");
        // no index on purpose
        let mut lookup = SnapshotLookup::open(f.path()).unwrap();
        let alice = PlayerKey::new("Alice", "NE", "QB");
        assert_eq!(lookup.value(&alice, "proj").unwrap(), "17.2");
    }

    #[test]
    fn placeholder_is_empty_via_both_paths() {
        let f = snapshot("name,team,pos,proj\nAlice,NE,QB,--\n");
        let alice = PlayerKey::new("Alice", "NE", "QB");

        let mut scan = SnapshotLookup::open(f.path()).unwrap();
        assert_eq!(scan.value(&alice, "proj").unwrap(), "");

        build_index(f.path());
        let mut indexed = SnapshotLookup::open(f.path()).unwrap();
        assert_eq!(indexed.value(&alice, "proj").unwrap(), "");

        std::fs::remove_file(index_path(f.path())).unwrap();
    }

    #[test]
    fn absent_column_is_empty() {
        let f = snapshot("name,team,pos\nAlice,NE,QB\n");
        let mut lookup = SnapshotLookup::open(f.path()).unwrap();
        let alice = PlayerKey::new("Alice", "NE", "QB");
        assert_eq!(lookup.value(&alice, "proj").unwrap(), "");
    }
}
