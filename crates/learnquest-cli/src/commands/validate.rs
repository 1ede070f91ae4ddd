//! The `learnquest validate` command.

use std::path::PathBuf;

use anyhow::Result;

use learnquest_core::catalog::{
    validate_catalog, validate_curriculum, AchievementCatalog, Curriculum, ValidationWarning,
};
use learnquest_storage::config::load_config_from;

pub fn execute(
    curriculum_path: Option<PathBuf>,
    achievements_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let curriculum_path = curriculum_path.unwrap_or(config.content.curriculum);
    let achievements_path = achievements_path.unwrap_or(config.content.achievements);

    let curriculum = Curriculum::load(&curriculum_path)?;
    println!(
        "Curriculum: {} ({} levels)",
        curriculum_path.display(),
        curriculum.len()
    );
    let mut total_warnings = print_warnings(&validate_curriculum(&curriculum));

    let catalog = AchievementCatalog::load(&achievements_path)?;
    println!(
        "Achievements: {} ({} achievements)",
        achievements_path.display(),
        catalog.len()
    );
    total_warnings += print_warnings(&validate_catalog(&catalog, &curriculum));

    if total_warnings == 0 {
        println!("All content valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) -> usize {
    for w in warnings {
        let prefix = w
            .subject
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
    warnings.len()
}
