// src/scrape/players.rs

use std::collections::HashSet;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::core::{html, net};
use crate::core::html::{inner_after_open_tag, next_tag_block_ci, slice_between_ci, strip_tags};
use crate::core::sanitize::normalize_entities;
use crate::file::{append_rows, ensure_directory, write_rows_start};
use crate::params::{DEFAULT_DATA_DIR, HOST, PAGE_SIZE, PLAYERS_PATH, Params};
use crate::progress::Progress;

/// Snapshot column order. `name`/`team`/`pos` lead because the aggregation
/// side keys on them.
pub const ROSTER_COLUMNS: [&str; 17] = [
    "name", "team", "pos", "status", "owner", "opp", "home_away", "status_et",
    "prk", "pts", "avg", "last", "proj", "oprk", "pct_st", "pct_own", "plus_minus",
];

const BYE: &str = "** BYE **";

pub struct PlayerInfo {
    pub name: String,
    pub team: String,
    pub pos: String,
    pub status: String,
}

/// Fetch the full free-agency player table and write one dated snapshot CSV
/// into the data directory. Returns the snapshot path.
pub fn run(params: &Params, progress: &mut dyn Progress) -> Result<PathBuf, Box<dyn Error>> {
    let league = params.league_id.as_deref().ok_or("Missing --league")?;
    let team = params.team_id.as_deref().ok_or("Missing --team")?;
    let season = params.season_id.as_deref().ok_or("Missing --season")?;
    let cookie = match &params.cookie_file {
        Some(p) => Some(fs::read_to_string(p)?),
        None => None,
    };

    let out_dir = params.out.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    ensure_directory(&out_dir)?;

    let rows = fetch_all(league, team, season, cookie.as_deref(), params.max_pages, progress)?;

    let path = out_dir.join(snapshot_filename(&Local::now()));
    let headers: Vec<String> = ROSTER_COLUMNS.iter().map(|s| s.to_string()).collect();
    write_rows_start(&path, Some(&headers))?;
    append_rows(&path, &rows)?;

    logf!("Wrote {} players to `{}`", rows.len(), path.display());
    progress.log(&format!("Wrote {} players to `{}`", rows.len(), path.display()));
    Ok(path)
}

/// `players-2017-09-07-thu-23-56.csv`
pub fn snapshot_filename(now: &DateTime<Local>) -> String {
    let date = now.format("%Y-%m-%d");
    let dow = now.format("%a").to_string().to_ascii_lowercase();
    let time = now.format("%H-%M");
    format!("players-{date}-{dow}-{time}.csv")
}

fn players_path(league: &str, team: &str, season: &str, offset: usize) -> String {
    format!(
        "{PLAYERS_PATH}?leagueId={league}&teamId={team}&seasonId={season}\
         &avail=-1&context=freeagency&view=overview&startIndex={offset}"
    )
}

/// Page through the player table, 50 at a time, until a page comes back
/// empty or a (name, team) pair repeats (the site wraps around past the end).
pub fn fetch_all(
    league: &str,
    team: &str,
    season: &str,
    cookie: Option<&str>,
    max_pages: Option<usize>,
    progress: &mut dyn Progress,
) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut offset = 0usize;
    let mut pages = 0usize;

    loop {
        if let Some(max) = max_pages {
            if pages >= max {
                logf!("Hit max page count {}", max);
                break;
            }
        }
        let path = players_path(league, team, season, offset);
        logf!("Fetching players at offset {}", offset);
        let doc = net::http_get(HOST, &path, cookie)?;
        pages += 1;

        let page_rows = extract_rows(&doc);
        let mut new_this_page = 0usize;
        for row in page_rows {
            let hash = (row[0].clone(), row[1].clone());
            if seen.contains(&hash) {
                logf!("Already saw `{} ({})`, all done here", hash.0, hash.1);
                return Ok(rows);
            }
            seen.insert(hash);
            rows.push(row);
            new_this_page += 1;
        }

        logf!("Offset {}: got {} players", offset, new_this_page);
        progress.log(&format!("Got {} players (total {})", new_this_page, rows.len()));
        if new_this_page == 0 {
            break;
        }
        offset += PAGE_SIZE;
    }
    Ok(rows)
}

/// All parseable player rows on one page, in `ROSTER_COLUMNS` order.
/// Rows that don't parse are logged and skipped.
pub fn extract_rows(doc: &str) -> Vec<Vec<String>> {
    // Prefer the player table block; fall back to the whole document when
    // the wrapper markup changes.
    let table = slice_between_ci(doc, r#"<table class="playerTableTable"#, "</table>")
        .unwrap_or(doc);

    let mut out = Vec::new();
    let mut pos = 0usize;

    while let Some((tr_s, tr_e)) = next_tag_block_ci(table, "<tr", "</tr>", pos) {
        let tr = &table[tr_s..tr_e];
        pos = tr_e;

        // Only player rows
        let prefix = &tr[..tr.len().min(200)];
        let lc = html::to_lower(prefix);
        if !lc.contains("pncplayerrow") { continue; }

        // <td> cells
        let mut cells = Vec::new();
        let mut td_pos = 0usize;
        while let Some((td_s, td_e)) = next_tag_block_ci(tr, "<td", "</td>", td_pos) {
            let block = &tr[td_s..td_e];
            let inner = inner_after_open_tag(block);
            let clean = strip_tags(normalize_entities(&inner));
            cells.push(clean);
            td_pos = td_e;
        }
        if cells.is_empty() { continue; }

        match parse_row_cells(&cells) {
            Some(row) => out.push(row),
            None => logd!("Skipping unparseable player row: {:?}", cells.first()),
        }
    }
    out
}

/* ---------- helpers ---------- */

/// `Ryan Fitzpatrick, NYJ QB Q` → name/team/pos/status (status defaults OK).
/// `Browns D/ST D/ST` → defense row; the site lists no team abbreviation.
pub fn parse_player_info(info: &str) -> Option<PlayerInfo> {
    if let Some((name, rest)) = info.split_once(", ") {
        let mut pieces = rest.split_whitespace();
        let team = pieces.next()?;
        let pos = pieces.next()?;
        let status = pieces.next().unwrap_or("OK");
        return Some(PlayerInfo {
            name: s!(name),
            team: s!(team),
            pos: s!(pos),
            status: s!(status),
        });
    }
    let mut pieces = info.split_whitespace();
    let name1 = pieces.next()?;
    let name2 = pieces.next()?;
    let pos = pieces.next()?;
    Some(PlayerInfo {
        name: format!("{name1} {name2}"),
        team: s!(),
        pos: s!(pos),
        status: s!("OK"),
    })
}

/// Fixed free-agency column layout. A BYE week drops the kickoff-time cell,
/// shifting everything after it left by one.
fn parse_row_cells(cells: &[String]) -> Option<Vec<String>> {
    let info = parse_player_info(cells.first()?)?;
    if cells.len() < 17 {
        return None;
    }

    let owner = cells[2].clone();
    let raw_opp = cells[5].as_str();
    let (opp, home_away) = match raw_opp.strip_prefix('@') {
        Some(rest) => (rest, "AWAY"),
        None => (raw_opp, "HOME"),
    };
    let (opp, status_et, adj): (&str, &str, isize) = if opp == BYE {
        ("BYE", "", -1)
    } else {
        (opp, cells[6].as_str(), 0)
    };

    let at = |i: isize| -> String { cells.get((i + adj) as usize).cloned().unwrap_or_default() };

    Some(vec![
        info.name,
        info.team,
        info.pos,
        info.status,
        owner,
        s!(opp),
        s!(home_away),
        s!(status_et),
        at(8),  // prk
        at(9),  // pts
        at(10), // avg
        at(11), // last
        at(13), // proj
        at(14), // oprk
        at(15), // pct_st
        at(16), // pct_own
        at(17), // plus_minus
    ])
}
