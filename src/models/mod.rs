pub mod profile;
pub mod program;
pub mod recommendation;

pub use profile::UserProfile;
pub use program::{Course, CourseKind, Program};
pub use recommendation::{
    IndexReport, PlanEntry, ProgramBrief, ProgramComparison, ProgramSummary, ScoredCourse,
    ScoredProgram, StudyPlan,
};
