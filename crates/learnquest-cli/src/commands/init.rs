//! The `learnquest init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("learnquest.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("data")?;
    write_if_missing(Path::new("data/levels.json"), SAMPLE_CURRICULUM)?;
    write_if_missing(Path::new("data/achievements.json"), SAMPLE_ACHIEVEMENTS)?;

    println!("\nNext steps:");
    println!("  1. Edit data/levels.json with your own levels");
    println!("  2. Run: learnquest validate");
    println!("  3. Run: learnquest quiz --user you --level 1 --answers 1,2");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# learnquest configuration

[storage]
backend = "file"
path = "./learnquest-data/progress.json"
key = "csharpGamifiedLearning"

[content]
curriculum = "./data/levels.json"
achievements = "./data/achievements.json"

[rewards]
xp_per_tier = 20
quiz_xp_min_score = 80
quiz_xp_divisor = 10
good_score_threshold = 70
good_score_xp = 5
hint_penalty = 5
"#;

const SAMPLE_CURRICULUM: &str = r#"{
  "levels": [
    {
      "id": 1,
      "title": "Variables",
      "description": "Declare and assign variables.",
      "tier": 1,
      "concept": "variables",
      "quiz": [
        {
          "q": "Which keyword declares an implicitly typed local?",
          "options": ["dim", "var", "let", "auto"],
          "answer": 1
        },
        {
          "q": "What is the default value of an int field?",
          "options": ["null", "undefined", "0", "-1"],
          "answer": 2
        }
      ]
    },
    {
      "id": 2,
      "title": "Control Flow",
      "description": "Branch and loop.",
      "tier": 1,
      "concept": "control-flow",
      "quiz": [
        {
          "q": "Which statements are loops?",
          "options": ["for", "if", "while", "switch"],
          "answer": [0, 2],
          "multi": true
        },
        {
          "q": "Which keyword leaves a loop early?",
          "options": ["exit", "break", "stop", "return"],
          "answer": 1
        }
      ]
    },
    {
      "id": 3,
      "title": "Methods",
      "description": "Define and call methods.",
      "tier": 2,
      "concept": "methods",
      "xp": 150,
      "quiz": [
        {
          "q": "Which modifier lets a method be overridden?",
          "options": ["static", "sealed", "virtual", "const"],
          "answer": 2
        }
      ]
    }
  ]
}
"#;

const SAMPLE_ACHIEVEMENTS: &str = r#"{
  "achievements": [
    {
      "id": "first_steps",
      "type": "levelComplete",
      "value": 1,
      "points": 10,
      "title": "First Steps",
      "description": "Complete the first level."
    },
    {
      "id": "tier_one",
      "type": "tierComplete",
      "value": 1,
      "points": 50,
      "title": "Foundations",
      "description": "Complete every tier 1 level."
    },
    {
      "id": "perfect_quiz",
      "type": "quizScore",
      "value": 100,
      "points": 25,
      "title": "Flawless",
      "description": "Score 100% on a quiz."
    }
  ]
}
"#;
