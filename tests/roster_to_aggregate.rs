// tests/roster_to_aggregate.rs
//
// Scraped roster HTML -> snapshot CSV -> aggregation, end to end.
//
use std::fs;

use ff_scrape::aggregate;
use ff_scrape::csv::parse_rows;
use ff_scrape::file::{append_rows, write_rows_start};
use ff_scrape::progress::NullProgress;
use ff_scrape::scrape::players::{ROSTER_COLUMNS, extract_rows};

fn page(rows: &str) -> String {
    format!(r#"<html><table class="playerTableTable">{rows}</table></html>"#)
}

fn player_tr(info: &str, proj: &str) -> String {
    format!(
        r#"<tr class="pncPlayerRow pncPlayerRowOdd">
            <td>{info}</td><td>Bench</td><td>Team X</td><td></td><td></td>
            <td>NYJ</td><td>Sun 1:00</td><td></td>
            <td>1</td><td>100</td><td>10.0</td><td>12.0</td><td></td>
            <td>{proj}</td><td>3</td><td>98</td><td>99</td><td>+1</td>
        </tr>"#
    )
}

#[test]
fn scraped_snapshot_feeds_the_aggregator() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("data");
    fs::create_dir(&dir).unwrap();

    let doc1 = page(&player_tr("<a>Jane Doe</a>, NE RB", "14.5"));
    let doc2 = page(&format!(
        "{}{}",
        player_tr("<a>Jane Doe</a>, NE RB", "12.0"),
        player_tr("<a>Jim Roe</a>, GB WR Q", "--"),
    ));

    let headers: Vec<String> = ROSTER_COLUMNS.iter().map(|s| s.to_string()).collect();
    for (name, doc) in [
        ("players-2017-09-01-fri-10-00.csv", &doc1),
        ("players-2017-09-02-sat-10-00.csv", &doc2),
    ] {
        let path = dir.join(name);
        write_rows_start(&path, Some(&headers)).unwrap();
        append_rows(&path, &extract_rows(doc)).unwrap();
    }

    let out = aggregate::aggregate_column(&dir, "proj", &mut NullProgress).unwrap();
    let rows = parse_rows(&fs::read_to_string(&out).unwrap(), ',');

    assert_eq!(rows[0], vec!["filename", "Jane Doe, NE RB", "Jim Roe, GB WR"]);
    assert_eq!(rows[1], vec!["players-2017-09-01-fri-10-00.csv", "14.5", ""]);
    // Jim Roe's placeholder proj normalizes to empty
    assert_eq!(rows[2], vec!["players-2017-09-02-sat-10-00.csv", "12.0", ""]);
}
