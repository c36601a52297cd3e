use serde::{Deserialize, Serialize};

/// Classification of a course within a program's curriculum
///
/// Catalog pages label courses with free text; classification is a substring
/// match against known markers. Anything unrecognized is `Unknown`, which
/// counts as "not elective" for elective-only filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseKind {
    Mandatory,
    Elective,
    #[default]
    Unknown,
}

impl CourseKind {
    /// Classifies a free-text course-type label
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("elective") {
            CourseKind::Elective
        } else if label.contains("mandatory") || label.contains("compulsory") {
            CourseKind::Mandatory
        } else {
            CourseKind::Unknown
        }
    }

    pub fn is_elective(&self) -> bool {
        matches!(self, CourseKind::Elective)
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self, CourseKind::Mandatory)
    }
}

/// A single teachable unit within a program
///
/// Immutable once created; owned by its program. `credits` and `semester` are
/// opaque strings taken verbatim from the scraped page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub kind: CourseKind,
    #[serde(default)]
    pub credits: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Course {
    /// Lowercased free text used for lexical matching
    pub fn lexical_haystack(&self) -> String {
        format!("{} {}", self.name, self.description).to_lowercase()
    }

    /// Text handed to the embedding model
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if !self.description.is_empty() {
            parts.push(self.description.as_str());
        }
        parts.extend(self.skills.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// A top-level academic offering with an ordered course catalog
///
/// Created by ingestion and updated wholesale by replacement; the course
/// sequence preserves catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub career: Vec<String>,
}

impl Program {
    /// Lowercased description + skills, used for lexical program matching
    pub fn lexical_haystack(&self) -> String {
        format!("{} {}", self.description, self.skills.join(" ")).to_lowercase()
    }

    /// Lowercased career text, matched against profile goals
    pub fn career_haystack(&self) -> String {
        self.career.join(" ").to_lowercase()
    }

    /// Text handed to the embedding model
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        if !self.description.is_empty() {
            parts.push(self.description.as_str());
        }
        parts.extend(self.skills.iter().map(String::as_str));
        parts.extend(self.career.iter().map(String::as_str));
        parts.join(" ")
    }

    pub fn elective_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.kind.is_elective())
    }

    pub fn mandatory_courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter().filter(|c| c.kind.is_mandatory())
    }
}
