use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::cli::{Cli, SessionArgs};
use crate::views::{detail_rows, DETAIL_PROMPT};
use super::{build_dashboard, print_output};

const HELP: &str = "\
commands:
  districts <a;b;...>   select districts (semicolon-separated)
  districts none        clear the selection
  choices               list available districts
  click <village>       activate a village on the map
  detail                show the current selection
  kpi                   show the headline numbers for the current view
  refresh               re-render without an interaction
  help                  this text
  quit                  end the session";

/// Interactive session: each line of input is one interaction, each
/// interaction drives the controller handlers and rewrites the artifacts.
pub fn run(_cli: &Cli, args: &SessionArgs) -> Result<()> {
    let mut dashboard = build_dashboard(&args.data)?;

    println!("districts available: {}", dashboard.district_choices()?.join(", "));
    println!("artifacts directory: {}", args.data.out.display());
    println!("{HELP}");

    let stdin = io::stdin();
    loop {
        print!("komodash> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "choices" => println!("{}", dashboard.district_choices()?.join(", ")),
            "districts" => {
                let districts: BTreeSet<String> = match rest {
                    "" | "none" => BTreeSet::new(),
                    list => list.split(';').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
                };
                print_output(&dashboard.on_filter_change(districts)?);
            }
            "click" if !rest.is_empty() => {
                print_output(&dashboard.on_map_click(rest)?);
            }
            "detail" => {
                let rows = detail_rows(dashboard.selection());
                if rows.is_empty() {
                    println!("{DETAIL_PROMPT}");
                } else {
                    for row in &rows {
                        println!("  {:<20} {}", row.label, row.value);
                    }
                }
            }
            "kpi" => {
                let out = dashboard.refresh()?;
                println!(
                    "Villages in view: {}  |  Districts selected: {}  |  POI total: {}",
                    out.kpis.villages_in_view, out.kpis.districts_selected, out.kpis.poi_total,
                );
            }
            "refresh" => print_output(&dashboard.refresh()?),
            "quit" | "exit" => break,
            _ => println!("unknown command {line:?}; try `help`"),
        }
    }

    Ok(())
}
