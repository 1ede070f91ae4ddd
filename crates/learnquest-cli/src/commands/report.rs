//! The `learnquest weaknesses` and `learnquest leaderboard` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnquest_core::mastery::{WeaknessReport, MIN_TOTAL_ATTEMPTS};

use super::Session;

pub fn weaknesses(user: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::open(config_path)?;
    let report = session.tracker.analyze_weaknesses(&user);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => match &report {
            WeaknessReport::NeedsMoreData { total_attempts } => {
                println!(
                    "Not enough data yet: {total_attempts} of {MIN_TOTAL_ATTEMPTS} answers recorded."
                );
            }
            WeaknessReport::Ready { weaknesses, .. } if weaknesses.is_empty() => {
                println!("No weak concepts. Keep it up!");
            }
            WeaknessReport::Ready { weaknesses, .. } => {
                let mut table = Table::new();
                table.set_header(vec!["Concept", "Attempts", "Accuracy", "Recent", "Weakness"]);
                for w in weaknesses {
                    table.add_row(vec![
                        Cell::new(&w.concept),
                        Cell::new(w.total_attempts),
                        Cell::new(format!("{}%", w.accuracy)),
                        Cell::new(format!("{}%", w.recent_accuracy)),
                        Cell::new(w.weakness_score),
                    ]);
                }
                println!("{table}");
            }
        },
    }
    Ok(())
}

pub fn leaderboard(limit: usize, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::open(config_path)?;
    let rows = session.tracker.leaderboard(limit);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            if rows.is_empty() {
                println!("No learners yet.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["#", "Learner", "XP", "XP Level", "Levels", "Best Streak", "Achievements"]);
            for row in &rows {
                table.add_row(vec![
                    Cell::new(row.rank),
                    Cell::new(&row.identity),
                    Cell::new(row.xp),
                    Cell::new(row.xp_level),
                    Cell::new(row.completed_levels),
                    Cell::new(row.max_streak),
                    Cell::new(row.achievements),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}
