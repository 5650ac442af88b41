// src/aggregate/identity.rs

use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::aggregate::index;
use crate::aggregate::reader::PositionReader;
use crate::params::{IDENTITY_CACHE_SUFFIX, KEY_DELIM, NAME_MARKER};
use crate::progress::Progress;

/// Canonical player identity: `(name, team, pos)`, with the site's injury
/// marker stripped from the name. Equal keys are the same player across all
/// snapshots; a trade or position change makes a distinct identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerKey {
    pub name: String,
    pub team: String,
    pub pos: String,
}

impl PlayerKey {
    pub fn new(name: &str, team: &str, pos: &str) -> Self {
        Self {
            name: name.replace(NAME_MARKER, ""),
            team: s!(team),
            pos: s!(pos),
        }
    }

    /// Serialized form used as the position-index key.
    pub fn cache_str(&self) -> String {
        format!("{}{d}{}{d}{}", self.name, self.team, self.pos, d = KEY_DELIM)
    }

    /// Inverse of `cache_str`. `None` if the delimiters aren't there.
    pub fn from_cache_str(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, KEY_DELIM);
        let name = parts.next()?;
        let team = parts.next()?;
        let pos = parts.next()?;
        Some(Self { name: s!(name), team: s!(team), pos: s!(pos) })
    }

    fn from_triple((name, team, pos): (String, String, String)) -> Self {
        Self { name, team, pos }
    }

    fn to_triple(&self) -> (String, String, String) {
        (self.name.clone(), self.team.clone(), self.pos.clone())
    }
}

impl fmt::Display for PlayerKey {
    // Output-column form: `Name, TEAM POS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} {}", self.name, self.team, self.pos)
    }
}

/* ---------------- Global identity cache ---------------- */

/// Cache file for a snapshot directory: named from its basename, written
/// beside it (same place the aggregation outputs land).
pub fn cache_path(dir: &Path) -> PathBuf {
    let base = dir.file_name().and_then(|s| s.to_str()).unwrap_or("snapshots");
    dir.parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{base}{IDENTITY_CACHE_SUFFIX}"))
}

/// Load the persisted global identity set; `None` on any failure. A stale
/// cache silently omits players first seen in newer snapshots; delete the
/// file to force a rescan.
pub fn load_cached(path: &Path) -> Option<Vec<PlayerKey>> {
    let file = File::open(path).ok()?;
    let triples: Vec<(String, String, String)> =
        serde_json::from_reader(BufReader::new(file)).ok()?;
    Some(triples.into_iter().map(PlayerKey::from_triple).collect())
}

fn save_cached(path: &Path, players: &[PlayerKey]) -> Result<(), Box<dyn Error>> {
    let triples: Vec<(String, String, String)> =
        players.iter().map(PlayerKey::to_triple).collect();
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &triples)?;
    Ok(())
}

/* ---------------- Resolution ---------------- */

/// Global identity set for `dir`: the cached set if one loads, else one full
/// scan of every snapshot (persisting the set, and each snapshot's position
/// index, on the way).
pub fn resolve(
    dir: &Path,
    snapshots: &[PathBuf],
    progress: &mut dyn Progress,
) -> Result<Vec<PlayerKey>, Box<dyn Error>> {
    let cache = cache_path(dir);
    if let Some(players) = load_cached(&cache) {
        logf!("Using players cache `{}`", cache.display());
        progress.log(&format!("Using players cache `{}`", cache.display()));
        return Ok(players);
    }
    logf!("Unable to load players cache `{}`, building it now ...", cache.display());

    let players = lookup_unique(snapshots, progress)?;
    if let Err(e) = save_cached(&cache, &players) {
        loge!("Error writing players cache `{}`: {}", cache.display(), e);
    }
    Ok(players)
}

/// One streaming pass over every snapshot: collect the identity set, and
/// persist each snapshot's position index as a side effect.
pub fn lookup_unique(
    snapshots: &[PathBuf],
    progress: &mut dyn Progress,
) -> Result<Vec<PlayerKey>, Box<dyn Error>> {
    progress.log("Getting unique players ...");
    progress.begin(snapshots.len());

    let mut players: BTreeSet<PlayerKey> = BTreeSet::new();
    for snap in snapshots {
        let mut reader = PositionReader::open(snap)?;
        let mut positions: HashMap<String, u64> = HashMap::new();
        while let Some((offset, fields)) = reader.next_row()? {
            let name = reader.field(&fields, "name").unwrap_or("");
            let team = reader.field(&fields, "team").unwrap_or("");
            let pos = reader.field(&fields, "pos").unwrap_or("");
            let key = PlayerKey::new(name, team, pos);
            positions.insert(key.cache_str(), offset);
            players.insert(key);
        }
        if let Err(e) = index::save(snap, &positions) {
            loge!("Error writing position index for `{}`: {}", snap.display(), e);
        }
        progress.item_done();
    }
    progress.finish();

    logf!("Found {} players", players.len());
    progress.log(&format!("Found {} players", players.len()));
    Ok(players.into_iter().collect())
}
