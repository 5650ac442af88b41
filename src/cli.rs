// src/cli.rs
use std::{env, path::PathBuf};

use crate::params::{Command, Params};
use crate::progress::ConsoleProgress;
use crate::{aggregate, depth, scrape};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let params = parse_cli()?;
    let mut progress = ConsoleProgress::new();

    match params.command {
        Command::Aggregate => {
            let dir = params.dir.clone().ok_or("Missing snapshot directory")?;
            match &params.column {
                Some(column) => { aggregate::aggregate_column(&dir, column, &mut progress)?; }
                None => { aggregate::aggregate(&dir, &mut progress)?; }
            }
        }
        Command::Roster => {
            scrape::players::run(&params, &mut progress)?;
        }
        Command::DepthChart => {
            let input = params.input.clone().ok_or("Missing depth chart JSON file")?;
            depth::convert(&input, &mut progress)?;
        }
    }
    Ok(())
}

fn parse_cli() -> Result<Params, Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);

    let first = args.next().ok_or("Missing command (try --help)")?;
    let command = match first.as_str() {
        "aggregate" => Command::Aggregate,
        "roster" => Command::Roster,
        "depth-chart" => Command::DepthChart,
        "-h" | "--help" => {
            eprintln!(include_str!("cli_help.txt"));
            std::process::exit(0);
        }
        other => return Err(format!("Unknown command: {}", other).into()),
    };

    let mut params = Params::new(command);
    while let Some(a) = args.next() {
        match a.as_str()
        {
            "-c" | "--column" => {
                params.column = Some(args.next().ok_or("Missing value for --column")?);
            }
            "--league" => params.league_id = Some(args.next().ok_or("Missing value for --league")?),
            "--team" => params.team_id = Some(args.next().ok_or("Missing value for --team")?),
            "--season" => params.season_id = Some(args.next().ok_or("Missing value for --season")?),
            "--cookie-file" => {
                params.cookie_file =
                    Some(PathBuf::from(args.next().ok_or("Missing value for --cookie-file")?));
            }
            "-o" | "--out" => {
                params.out = Some(PathBuf::from(args.next().ok_or("Missing output path")?));
            }
            "--max-pages" => {
                params.max_pages =
                    Some(args.next().ok_or("Missing value for --max-pages")?.parse()?);
            }
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            other => {
                if other.starts_with('-') {
                    return Err(format!("Unknown arg: {}", other).into());
                }
                match params.command {
                    Command::Aggregate => {
                        if params.dir.is_none() {
                            params.dir = Some(PathBuf::from(other));
                        } else if params.column.is_none() {
                            params.column = Some(s!(other));
                        } else {
                            return Err(format!("Unexpected arg: {}", other).into());
                        }
                    }
                    Command::DepthChart => {
                        if params.input.is_none() {
                            params.input = Some(PathBuf::from(other));
                        } else {
                            return Err(format!("Unexpected arg: {}", other).into());
                        }
                    }
                    Command::Roster => {
                        return Err(format!("Unexpected arg: {}", other).into());
                    }
                }
            }
        }
    }

    Ok(params)
}
