// src/depth.rs

use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::file::{append_rows, write_rows_start};
use crate::progress::Progress;

/// One node of the depth-chart widget's JSON dump: a tree of `children`
/// lists with optional display text at each level.
#[derive(Debug, Default, Deserialize)]
struct Node {
    #[serde(default)]
    children: Vec<Node>,
    #[serde(default)]
    text: Option<String>,
}

impl Node {
    fn child(&self, i: usize) -> Option<&Node> {
        self.children.get(i)
    }

    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Convert a depth-chart JSON dump into `(team, name, position, rank)` CSV
/// rows at `<file>.csv`. No header row. Returns the output path.
pub fn convert(input: &Path, progress: &mut dyn Progress) -> Result<PathBuf, Box<dyn Error>> {
    let file = File::open(input)?;
    let root: Node = serde_json::from_reader(BufReader::new(file))?;
    let rows = chart_rows(&root);

    let out = PathBuf::from(format!("{}.csv", input.display()));
    write_rows_start(&out, None)?;
    append_rows(&out, &rows)?;

    logf!("Wrote {} depth chart rows to `{}`", rows.len(), out.display());
    progress.log(&format!("Wrote {} depth chart rows to `{}`", rows.len(), out.display()));
    Ok(out)
}

/// The chart lists team names and per-team rosters as parallel sibling
/// trees. A player's position cell is only filled on the first player at
/// that position; it carries forward for the rest.
fn chart_rows(root: &Node) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let Some(data) = root.child(0) else { return out };
    let Some(team_list) = data.child(0) else { return out };
    let teams: Vec<String> = team_list
        .children
        .iter()
        .filter_map(|t| t.child(0).map(|c| c.text().to_string()))
        .collect();
    let Some(rosters) = data.child(1) else { return out };

    for (team, container) in teams.iter().zip(&rosters.children) {
        let players = match container.child(0).and_then(|c| c.child(0)) {
            Some(c) => &c.children,
            None => {
                logd!("Malformed depth chart container for team `{}`", team);
                continue;
            }
        };
        let mut position = s!();
        for player in players {
            if let Some(p) = player.child(0).and_then(|c| c.child(0)) {
                if !p.text().is_empty() {
                    position = s!(p.text());
                }
            }
            let Some(name_node) = player.child(1) else {
                logd!("Malformed depth chart player under `{}`", team);
                continue;
            };
            let name = match name_node.child(0) {
                Some(n) => n.text().to_string(),
                None => {
                    logd!("Depth chart player without a name under `{}`", team);
                    continue;
                }
            };
            // Rank renders as "1." / "2." etc.
            let rank = name_node.text().split('.').next().unwrap_or("").to_string();
            out.push(vec![team.clone(), name, position.clone(), rank]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(json: &str) -> Vec<Vec<String>> {
        chart_rows(&serde_json::from_str(json).unwrap())
    }

    #[test]
    fn walks_teams_and_carries_position_forward() {
        let rows = chart(
            r#"{"children": [{"children": [
                {"children": [
                    {"children": [{"text": "Patriots"}]}
                ]},
                {"children": [
                    {"children": [{"children": [{"children": [
                        {"children": [
                            {"children": [{"text": "QB"}]},
                            {"text": "1.", "children": [{"text": "Jane Doe"}]}
                        ]},
                        {"children": [
                            {"children": [{}]},
                            {"text": "2.", "children": [{"text": "Jim Roe"}]}
                        ]}
                    ]}]}]}
                ]}
            ]}]}"#,
        );
        assert_eq!(
            rows,
            vec![
                vec![s!("Patriots"), s!("Jane Doe"), s!("QB"), s!("1")],
                vec![s!("Patriots"), s!("Jim Roe"), s!("QB"), s!("2")],
            ]
        );
    }

    #[test]
    fn malformed_nodes_are_skipped() {
        let rows = chart(
            r#"{"children": [{"children": [
                {"children": [{"children": [{"text": "Jets"}]}]},
                {"children": [{"children": []}]}
            ]}]}"#,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_tree_yields_no_rows() {
        assert!(chart(r#"{}"#).is_empty());
    }
}
