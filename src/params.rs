// src/params.rs
use std::path::PathBuf;

/// Literal the source site emits for "no value" in stat columns.
pub const PLACEHOLDER: &str = "--";

/// Marker the site appends to names inconsistently (injury flag).
pub const NAME_MARKER: char = '*';

/// Joins (name, team, pos) into the serialized index key.
/// Never appears in names/teams/positions on the source site.
pub const KEY_DELIM: char = '|';

/// Sidecar next to each snapshot: serialized key → byte offset.
pub const INDEX_SUFFIX: &str = "-player-position-cache.json";

/// Global identity cache, named from the snapshot directory basename.
pub const IDENTITY_CACHE_SUFFIX: &str = ".players-cache.json";

pub const SNAPSHOT_EXT: &str = "csv";
pub const DEFAULT_DATA_DIR: &str = "data";

pub const HOST: &str = "games.espn.com";
pub const PLAYERS_PATH: &str = "/ffl/playertable/prebuilt/freeagency";
pub const PAGE_SIZE: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Long mode, or wide mode when a column is given.
    Aggregate,
    /// Fetch one dated roster snapshot into the data dir.
    Roster,
    /// Depth chart JSON → CSV one-off transform.
    DepthChart,
}

#[derive(Clone)]
pub struct Params {
    pub command: Command,
    pub dir: Option<PathBuf>,        // snapshot directory (aggregate)
    pub column: Option<String>,      // wide mode column (aggregate)
    pub out: Option<PathBuf>,        // data dir override (roster)
    pub league_id: Option<String>,   // roster page query params
    pub team_id: Option<String>,
    pub season_id: Option<String>,
    pub cookie_file: Option<PathBuf>,// session cookie for the roster page
    pub max_pages: Option<usize>,    // cap on pagination requests
    pub input: Option<PathBuf>,      // depth chart JSON file
}

impl Params {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            dir: None,
            column: None,
            out: None,
            league_id: None,
            team_id: None,
            season_id: None,
            cookie_file: None,
            max_pages: None,
            input: None,
        }
    }
}
