//! The `learnquest show` and `learnquest reset` commands.

use std::path::PathBuf;

use anyhow::Result;

use learnquest_core::catalog::Curriculum;

use super::Session;

pub fn show(user: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::open(config_path)?;
    // Progress is still worth showing without content files.
    let curriculum = session.curriculum().unwrap_or_else(|e| {
        tracing::warn!("showing progress without a curriculum: {e:#}");
        Curriculum::default()
    });
    let summary = session.tracker.summary(&user, &curriculum);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            println!("Learner: {}", summary.identity);
            println!("  XP:            {} (level {})", summary.xp, summary.xp_level);
            println!(
                "  Levels:        {}/{} ({}%)",
                summary.completed_levels, summary.total_levels, summary.completion_percent
            );
            match summary.accuracy_percent {
                Some(acc) => println!("  Accuracy:      {acc}% over {} answers", summary.attempts),
                None => println!("  Accuracy:      no answers yet"),
            }
            println!(
                "  Streak:        {} day(s) (best {})",
                summary.current_streak, summary.max_streak
            );
            if let Some(date) = summary.last_completion_date {
                println!("  Last active:   {date}");
            }
            println!("  Achievements:  {}", summary.achievements);
            println!("  To practice:   {}", summary.pending_practice);
            println!("  Hints used:    {}", summary.hints_used);
        }
    }

    Ok(())
}

pub fn reset(user: String, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::open(config_path)?;
    if session.tracker.reset(&user)? {
        println!("Erased progress for {user}.");
    } else {
        println!("No progress stored for {user}.");
    }
    Ok(())
}
