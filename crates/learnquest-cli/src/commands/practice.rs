//! The `learnquest practice` and `learnquest practiced` commands.

use std::path::PathBuf;

use anyhow::Result;

use super::Session;

pub fn list(
    user: String,
    limit: usize,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    let set = session.tracker.select_practice_set(&user, limit);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        _ => {
            if set.is_empty() {
                println!("Nothing to practice.");
                return Ok(());
            }
            for miss in &set {
                println!(
                    "[L{} Q{}] {}",
                    miss.level_id, miss.question_index, miss.question
                );
                for (i, option) in miss.options.iter().enumerate() {
                    println!("    {i}. {option}");
                }
                println!("    you answered {}", miss.user_answer);
            }
        }
    }
    Ok(())
}

pub fn record(
    user: String,
    level_id: u32,
    question: usize,
    correct: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    if session
        .tracker
        .mark_practiced(&user, level_id, question, correct)?
    {
        let outcome = if correct { "correct" } else { "still wrong" };
        println!("Practiced level {level_id} question {question}: {outcome}.");
    } else {
        println!("No missed question at level {level_id} question {question}.");
    }
    Ok(())
}
