use std::collections::BTreeSet;

use crate::models::{Program, ProgramBrief, ProgramComparison, ProgramSummary};

const EXCERPT_CHARS: usize = 300;
const SUMMARY_SKILLS: usize = 5;
const SUMMARY_CAREER: usize = 3;

/// Produces a short structured overview of a program
pub fn summarize(program: &Program) -> ProgramSummary {
    ProgramSummary {
        id: program.id.clone(),
        title: program.title.clone(),
        description_excerpt: excerpt(&program.description, EXCERPT_CHARS),
        course_count: program.courses.len(),
        skills: program.skills.iter().take(SUMMARY_SKILLS).cloned().collect(),
        career: program.career.iter().take(SUMMARY_CAREER).cloned().collect(),
    }
}

/// Compares two programs by course count and skill sets
///
/// Skills are deduplicated and sorted so the common and unique lists are
/// deterministic and never overlap.
pub fn compare(first: &Program, second: &Program) -> ProgramComparison {
    let first_skills: BTreeSet<&str> = first.skills.iter().map(String::as_str).collect();
    let second_skills: BTreeSet<&str> = second.skills.iter().map(String::as_str).collect();

    ProgramComparison {
        first: ProgramBrief::from(first),
        second: ProgramBrief::from(second),
        common_skills: first_skills
            .intersection(&second_skills)
            .map(|s| s.to_string())
            .collect(),
        only_first: first_skills
            .difference(&second_skills)
            .map(|s| s.to_string())
            .collect(),
        only_second: second_skills
            .difference(&first_skills)
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Character-boundary-safe prefix of a description
fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
