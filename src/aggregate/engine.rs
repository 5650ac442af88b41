// src/aggregate/engine.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::aggregate::discover;
use crate::aggregate::identity::{self, PlayerKey};
use crate::aggregate::index::SnapshotLookup;
use crate::file::{append_rows, write_rows_start};
use crate::params::PLACEHOLDER;
use crate::progress::Progress;

/// Output files land beside the snapshot directory, named from its basename.
fn out_path(dir: &Path, filename: String) -> PathBuf {
    dir.parent().unwrap_or_else(|| Path::new("")).join(filename)
}

fn dir_basename(dir: &Path) -> String {
    dir.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshots")
        .to_string()
}

fn file_basename(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/* ---------------- Wide mode ---------------- */

/// One row per snapshot, one column per identity, single attribute.
/// Snapshots outer, identities inner: row-major by date.
pub fn aggregate_column(
    dir: &Path,
    column: &str,
    progress: &mut dyn Progress,
) -> Result<PathBuf, Box<dyn Error>> {
    logf!("Aggregating data from dir `{}` / column `{}` ...", dir.display(), column);
    let files = discover::snapshots(dir, progress)?;
    logf!("Got {} snapshot files", files.len());
    progress.log(&format!("Got {} snapshot files", files.len()));

    let players = identity::resolve(dir, &files, progress)?;

    let out = out_path(dir, format!("{}-players-all-{}.csv", dir_basename(dir), column));
    logf!("Writing to `{}`", out.display());

    let mut header = vec![s!("filename")];
    header.extend(players.iter().map(|p| p.to_string()));
    write_rows_start(&out, Some(&header))?;

    progress.log("Writing snapshot rows ...");
    progress.begin(files.len());
    for file in &files {
        match row_for_column(&players, file, column) {
            Ok(Some(row)) => append_rows(&out, std::slice::from_ref(&row))?,
            // Every identity missing for this snapshot; the row is skipped
            // so the output doesn't carry all-blank lines.
            Ok(None) => {}
            Err(e) => {
                loge!("Error getting row for snapshot `{}`: {}", file.display(), e);
            }
        }
        progress.item_done();
    }
    progress.finish();

    let summary = format!(
        "Aggregated {} players over {} snapshots into `{}`",
        players.len(),
        files.len(),
        out.display()
    );
    logf!("{}", summary);
    progress.log(&summary);
    Ok(out)
}

/// One wide-mode output row, or `None` when every identity came back empty.
fn row_for_column(
    players: &[PlayerKey],
    file: &Path,
    column: &str,
) -> Result<Option<Vec<String>>, Box<dyn Error>> {
    let mut row = vec![file_basename(file)];
    let mut num_missing = 0usize;

    let mut lookup = SnapshotLookup::open(file)?;
    for player in players {
        let value = lookup.value(player, column)?;
        if value.is_empty() {
            logd!("Missing player `{}` for snapshot `{}`", player, file.display());
            num_missing += 1;
        }
        row.push(value);
    }

    if num_missing > 0 {
        logf!(
            "Missing {} of {} players for snapshot `{}`",
            num_missing,
            players.len(),
            file.display()
        );
        if num_missing == players.len() {
            return Ok(None);
        }
    }
    Ok(Some(row))
}

/* ---------------- Long mode ---------------- */

/// One row per (identity, snapshot) pair that has a record, with the full
/// attribute set inferred from the first matched row. Identities outer,
/// snapshots inner: row-major by player.
pub fn aggregate(dir: &Path, progress: &mut dyn Progress) -> Result<PathBuf, Box<dyn Error>> {
    logf!("Aggregating data from dir `{}` ...", dir.display());
    let files = discover::snapshots(dir, progress)?;
    logf!("Got {} snapshot files", files.len());
    progress.log(&format!("Got {} snapshot files", files.len()));

    let players = identity::resolve(dir, &files, progress)?;

    let out = out_path(dir, format!("{}-players-all.csv", dir_basename(dir)));
    logf!("Writing to `{}`", out.display());
    write_rows_start(&out, None)?;

    // Attribute columns come from the first matched row; until one shows up
    // there is nothing to head the file with.
    let mut attrs: Option<Vec<String>> = None;

    progress.log("Writing player rows ...");
    progress.begin(players.len());
    for player in &players {
        let player_str = player.to_string();
        let mut batch: Vec<Vec<String>> = Vec::new();

        for file in &files {
            let mut lookup = match SnapshotLookup::open(file) {
                Ok(l) => l,
                Err(e) => {
                    loge!("Error opening snapshot `{}`: {}", file.display(), e);
                    continue;
                }
            };
            let fields = match lookup.find(player) {
                Ok(Some(fields)) => fields,
                Ok(None) => continue,
                Err(e) => {
                    loge!("Error reading snapshot `{}`: {}", file.display(), e);
                    continue;
                }
            };

            if attrs.is_none() {
                let found = lookup.header().to_vec();
                let mut header = vec![s!("player"), s!("filename")];
                header.extend(found.iter().cloned());
                batch.push(header);
                attrs = Some(found);
            }
            let Some(keys) = attrs.as_ref() else { continue };

            let mut row = vec![player_str.clone(), file.display().to_string()];
            for key in keys {
                let value = match lookup.field(&fields, key) {
                    Some(v) if v != PLACEHOLDER => s!(v),
                    _ => s!(),
                };
                row.push(value);
            }
            batch.push(row);
        }

        if !batch.is_empty() {
            append_rows(&out, &batch)?;
        }
        progress.item_done();
    }
    progress.finish();

    // Zero matches anywhere: emit the base header so the file isn't bare.
    if attrs.is_none() {
        append_rows(&out, &[vec![s!("player"), s!("filename")]])?;
    }

    let summary = format!(
        "Aggregated {} players over {} snapshots into `{}`",
        players.len(),
        files.len(),
        out.display()
    );
    logf!("{}", summary);
    progress.log(&summary);
    Ok(out)
}
