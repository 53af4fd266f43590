//! Interactive options menu shown once monitoring stops.

use std::io::{BufRead, Write};

use crate::engine::search;
use crate::engine::searcher::SearchOutcome;
use crate::error::Result;
use crate::storage::{ResultSetName, SharedCatalog};

/// Write a search outcome the way the menu displays it.
pub fn render_outcome<W: Write>(out: &mut W, set: &ResultSetName, outcome: &SearchOutcome) -> std::io::Result<()> {
    match outcome {
        SearchOutcome::Matches(rows) => {
            writeln!(out, "\nSearch results in table {}:", set)?;
            for row in rows {
                writeln!(out, "{}", row)?;
            }
        }
        SearchOutcome::NoMatches => writeln!(out, "\nNo matches found for the search term.")?,
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> std::io::Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Read choices from `input` until the user exits or input ends.
pub fn run_menu<R: BufRead, W: Write>(
    catalog: &SharedCatalog,
    mut set: ResultSetName,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        writeln!(out, "Options:")?;
        writeln!(out, "1. Search for term")?;
        writeln!(out, "2. Use a different result set (current: {})", set)?;
        writeln!(out, "3. Exit")?;

        let Some(choice) = prompt(input, out, "Enter your choice: ")? else { break };
        match choice.trim() {
            "1" => {
                let Some(term) = prompt(input, out, "Enter the search term: ")? else { break };
                match search(catalog, &term, &set) {
                    Ok(outcome) => render_outcome(out, &set, &outcome)?,
                    Err(e) => {
                        tracing::error!("[Menu] Error while searching for term: {}", e);
                        writeln!(out, "\nSearch failed: {}", e)?;
                    }
                }
            }
            "2" => {
                let Some(name) = prompt(input, out, "Enter the result set name: ")? else { break };
                match ResultSetName::new(name.trim()) {
                    Ok(new_set) => set = new_set,
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
            "3" => break,
            _ => writeln!(out, "Invalid choice. Please try again.")?,
        }
    }
    tracing::info!("[Menu] Exiting");
    Ok(())
}
