use serde::{Deserialize, Serialize};

use crate::models::{Course, Program};

/// A course paired with its relevance score in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCourse {
    pub course: Course,
    pub score: f32,
}

/// A program paired with its match score in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProgram {
    pub program: Program,
    pub score: f32,
}

/// One mandatory-course line of a study plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub name: String,
    pub semester: String,
}

/// A recommended study plan for one program
///
/// Mandatory courses appear in catalog order; electives are the top scoring
/// recommendations; hints are derived directly from profile fields, not from
/// scoring. All of it is structured data for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub program_id: String,
    pub title: String,
    pub mandatory: Vec<PlanEntry>,
    pub electives: Vec<ScoredCourse>,
    pub hints: Vec<String>,
}

/// Outcome of a catalog indexing run
///
/// Per-item failures are skipped, never rolled back, so the counts describe
/// an at-least-effort batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub courses: usize,
    pub programs: usize,
    pub skipped: usize,
}

/// Condensed program listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramBrief {
    pub id: String,
    pub title: String,
    pub course_count: usize,
}

impl From<&Program> for ProgramBrief {
    fn from(program: &Program) -> Self {
        Self {
            id: program.id.clone(),
            title: program.title.clone(),
            course_count: program.courses.len(),
        }
    }
}

/// Short structured overview of one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub id: String,
    pub title: String,
    pub description_excerpt: String,
    pub course_count: usize,
    pub skills: Vec<String>,
    pub career: Vec<String>,
}

/// Side-by-side comparison of two programs
///
/// Skill sets are deduplicated and sorted so the output is deterministic;
/// `common_skills` and the two unique lists never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramComparison {
    pub first: ProgramBrief,
    pub second: ProgramBrief,
    pub common_skills: Vec<String>,
    pub only_first: Vec<String>,
    pub only_second: Vec<String>,
}
