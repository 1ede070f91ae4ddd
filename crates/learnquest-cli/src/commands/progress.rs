//! The `learnquest attempt`, `quiz`, `complete` and `hint` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use learnquest_core::model::{Answer, Difficulty};
use learnquest_core::rewards::StreakTransition;

use super::Session;

pub fn attempt(
    user: String,
    level_id: u32,
    question: usize,
    correct: bool,
    concept: Option<String>,
    difficulty: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(config_path)?;

    let difficulty = difficulty
        .map(|d| d.parse::<Difficulty>().map_err(anyhow::Error::msg))
        .transpose()?;

    let (concept, difficulty) = match (concept, difficulty) {
        (Some(c), Some(d)) => (c, d),
        (concept, difficulty) => {
            let curriculum = session.curriculum()?;
            let level = curriculum
                .level(level_id)
                .with_context(|| format!("unknown level: {level_id}"))?;
            let concept = match concept {
                Some(c) => c,
                None => level
                    .quiz
                    .get(question)
                    .map(|q| level.concept_for(q).to_string())
                    .unwrap_or_else(|| level.title.clone()),
            };
            (concept, difficulty.unwrap_or_else(|| level.difficulty()))
        }
    };

    session
        .tracker
        .record_attempt(&user, level_id, question, correct, &concept, difficulty)?;
    println!(
        "Recorded {} answer for level {level_id} question {question} ({concept}, {difficulty}).",
        if correct { "correct" } else { "wrong" }
    );
    Ok(())
}

pub fn quiz(
    user: String,
    level_id: u32,
    answers: String,
    proceed: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let answers = parse_answers(&answers)?;
    let session = Session::open(config_path)?;
    let curriculum = session.curriculum()?;
    let catalog = session.achievements()?;

    let outcome = session
        .tracker
        .submit_quiz(&user, level_id, &answers, &curriculum, &catalog)?;

    let score = outcome.graded.score_percent;
    let proceeded = if proceed && session.tracker.config().is_good_score(score) {
        Some(session.tracker.proceed_with_good_score(
            &user,
            level_id,
            score,
            &curriculum,
            &catalog,
        )?)
    } else {
        None
    };

    match format.as_str() {
        "json" => {
            let body = serde_json::json!({ "quiz": outcome, "completion": proceeded });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        _ => {
            println!(
                "Level {level_id}: {}/{} correct ({}%)",
                outcome.graded.correct,
                outcome.graded.total(),
                outcome.graded.score_percent
            );
            for q in outcome.graded.questions.iter().filter(|q| !q.is_correct) {
                println!(
                    "  Q{}: answered {}, expected {} ({})",
                    q.question_index, q.submitted, q.expected, q.concept
                );
            }
            if outcome.quiz_xp > 0 {
                println!("Quiz XP: +{}", outcome.quiz_xp);
            }
            for a in &outcome.new_achievements {
                println!("Unlocked: {} (+{} XP)", a.id, a.points);
            }
            match &proceeded {
                Some(done) => {
                    if done.first_completion {
                        println!("Completed level {level_id} (+{} XP).", done.level_xp);
                    } else {
                        println!("Level {level_id} was already complete.");
                    }
                    for a in &done.new_achievements {
                        println!("Unlocked: {} (+{} XP)", a.id, a.points);
                    }
                    println!("Total XP: {}", done.total_xp);
                }
                None => {
                    if proceed {
                        println!(
                            "A score of {score}% is below {}%; level {level_id} stays open.",
                            session.tracker.config().good_score_threshold
                        );
                    }
                    println!("Total XP: {}", outcome.total_xp);
                }
            }
        }
    }
    Ok(())
}

pub fn complete(
    user: String,
    level_id: u32,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(config_path)?;
    let curriculum = session.curriculum()?;
    let catalog = session.achievements()?;

    let completed = session.tracker.profile(&user).completed_levels;
    if curriculum.level(level_id).is_some() && !curriculum.is_unlocked(level_id, &completed) {
        tracing::warn!("level {level_id} completed before its predecessor");
    }

    let completion = session
        .tracker
        .complete_level(&user, level_id, &curriculum, &catalog)?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&completion)?);
        }
        _ => {
            if completion.first_completion {
                println!(
                    "Completed level {level_id} (+{} XP).",
                    completion.level_xp
                );
            } else {
                println!("Level {level_id} was already complete.");
            }
            let streak = &completion.streak.streak;
            let note = match completion.streak.transition {
                StreakTransition::Started => "started",
                StreakTransition::Continued => "continued",
                StreakTransition::Broken => "restarted",
                StreakTransition::SameDay => "unchanged",
            };
            println!(
                "Streak {note}: {} day(s) (best {})",
                streak.current_streak, streak.max_streak
            );
            for a in &completion.new_achievements {
                println!("Unlocked: {} (+{} XP)", a.id, a.points);
            }
            println!("Total XP: {}", completion.total_xp);
        }
    }
    Ok(())
}

pub fn hint(user: String, config_path: Option<PathBuf>) -> Result<()> {
    let session = Session::open(config_path)?;
    let penalty = session.tracker.config().hint_penalty;
    let total = session.tracker.use_hint(&user)?;
    println!("Hint taken (-{penalty} XP). Total XP: {total}");
    Ok(())
}

fn parse_answers(raw: &str) -> Result<Vec<Answer>> {
    raw.split(',')
        .map(|part| part.parse::<Answer>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid answers: {raw:?}"))
}
