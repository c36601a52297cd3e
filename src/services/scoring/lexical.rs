use crate::{
    error::AppResult,
    models::{Course, Program, ScoredCourse, ScoredProgram, UserProfile},
    services::scoring::{Scorer, PROGRAM_RECOMMENDATION_LIMIT},
};

// Per-match category weights for course scoring
const INTEREST_WEIGHT: f32 = 0.30;
const GOAL_WEIGHT: f32 = 0.25;
const PROGRAM_SKILL_WEIGHT: f32 = 0.15;
const BACKGROUND_WEIGHT: f32 = 0.10;

// Per-match category weights for program scoring
const PROGRAM_INTEREST_WEIGHT: f32 = 0.20;
const PROGRAM_GOAL_WEIGHT: f32 = 0.30;
const REQUIREMENT_WEIGHT: f32 = 0.15;

/// Keyword-overlap scoring with no external dependencies
///
/// Each profile fragment that appears as a substring of the target's
/// lowercased text contributes its category weight. Contributions accumulate
/// per fragment and the total clamps to 1.0, so a profile with many
/// overlapping terms saturates rather than averages.
pub struct LexicalScorer;

impl LexicalScorer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LexicalScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_fragment(haystack: &str, fragment: &str) -> bool {
    let needle = fragment.trim().to_lowercase();
    !needle.is_empty() && haystack.contains(&needle)
}

/// Relevance of one course for a profile, in [0, 1]
///
/// The program supplies the skill tags matched against the course text;
/// profile skills themselves do not participate in course scoring.
pub fn course_relevance(profile: &UserProfile, course: &Course, program: &Program) -> f32 {
    let haystack = course.lexical_haystack();
    let mut score = 0.0;

    for interest in &profile.interests {
        if contains_fragment(&haystack, interest) {
            score += INTEREST_WEIGHT;
        }
    }

    for goal in &profile.goals {
        if contains_fragment(&haystack, goal) {
            score += GOAL_WEIGHT;
        }
    }

    for skill in &program.skills {
        if contains_fragment(&haystack, skill) {
            score += PROGRAM_SKILL_WEIGHT;
        }
    }

    for background in &profile.background {
        if contains_fragment(&haystack, background) {
            score += BACKGROUND_WEIGHT;
        }
    }

    score.min(1.0)
}

/// Match of one program for a profile, in [0, 1]
///
/// Interests are matched against the program description and skills, goals
/// against the career text, and each background fragment against each
/// admission requirement.
pub fn program_match(profile: &UserProfile, program: &Program) -> f32 {
    let program_text = program.lexical_haystack();
    let career_text = program.career_haystack();
    let mut score = 0.0;

    for interest in &profile.interests {
        if contains_fragment(&program_text, interest) {
            score += PROGRAM_INTEREST_WEIGHT;
        }
    }

    for goal in &profile.goals {
        if contains_fragment(&career_text, goal) {
            score += PROGRAM_GOAL_WEIGHT;
        }
    }

    for requirement in &program.requirements {
        let requirement_text = requirement.to_lowercase();
        for background in &profile.background {
            if contains_fragment(&requirement_text, background) {
                score += REQUIREMENT_WEIGHT;
            }
        }
    }

    score.min(1.0)
}

#[async_trait::async_trait]
impl Scorer for LexicalScorer {
    async fn rank_courses(
        &self,
        profile: &UserProfile,
        program: &Program,
        candidates: &[Course],
        limit: usize,
    ) -> AppResult<Vec<ScoredCourse>> {
        let mut ranked: Vec<ScoredCourse> = candidates
            .iter()
            .map(|course| ScoredCourse {
                course: course.clone(),
                score: course_relevance(profile, course, program),
            })
            .collect();

        // Stable sort keeps catalog order for equal scores
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);

        Ok(ranked)
    }

    async fn rank_programs(
        &self,
        profile: &UserProfile,
        catalog: &[Program],
    ) -> AppResult<Vec<ScoredProgram>> {
        let mut ranked: Vec<ScoredProgram> = catalog
            .iter()
            .map(|program| ScoredProgram {
                program: program.clone(),
                score: program_match(profile, program),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(PROGRAM_RECOMMENDATION_LIMIT);

        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseKind;

    fn course(name: &str, description: &str) -> Course {
        Course {
            name: name.to_string(),
            kind: CourseKind::Elective,
            credits: "3".to_string(),
            semester: "2".to_string(),
            description: description.to_string(),
            skills: vec![],
        }
    }

    fn program(skills: Vec<&str>) -> Program {
        Program {
            id: "ai".to_string(),
            title: "Artificial Intelligence".to_string(),
            url: String::new(),
            description: "Deep learning and applied AI engineering".to_string(),
            courses: vec![],
            requirements: vec![],
            skills: skills.into_iter().map(str::to_string).collect(),
            career: vec![],
        }
    }

    fn profile_with(interests: Vec<&str>, goals: Vec<&str>, background: Vec<&str>) -> UserProfile {
        let mut profile = UserProfile::new(1);
        profile.interests = interests.into_iter().map(str::to_string).collect();
        profile.goals = goals.into_iter().map(str::to_string).collect();
        profile.background = background.into_iter().map(str::to_string).collect();
        profile
    }

    #[test]
    fn test_single_interest_match_scores_030() {
        let profile = profile_with(vec!["machine learning"], vec![], vec![]);
        let course = course("ML Basics", "intro to machine learning");
        let program = program(vec![]);

        let score = course_relevance(&profile, &course, &program);
        assert!((score - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_multi_category_match_saturates_at_sum() {
        // Two interests (0.30 each) plus one goal (0.25): min(0.85, 1.0)
        let profile = profile_with(vec!["nlp", "ml"], vec!["data scientist"], vec![]);
        let course = course(
            "Applied ML",
            "from ml and nlp fundamentals to the data scientist toolbox",
        );
        let program = program(vec![]);

        let score = course_relevance(&profile, &course, &program);
        assert!((score - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_score_clamps_to_one() {
        let profile = profile_with(
            vec!["data", "data science", "science", "analytics"],
            vec![],
            vec![],
        );
        let course = course("Data Science", "data science and analytics");
        let program = program(vec![]);

        assert_eq!(course_relevance(&profile, &course, &program), 1.0);
    }

    #[test]
    fn test_no_match_is_exactly_zero() {
        let profile = profile_with(vec!["robotics"], vec!["game dev"], vec!["art school"]);
        let course = course("Databases", "relational algebra and sql");
        let program = program(vec![]);

        assert_eq!(course_relevance(&profile, &course, &program), 0.0);
    }

    #[test]
    fn test_empty_fragments_do_not_match() {
        let profile = profile_with(vec!["", "   "], vec![], vec![]);
        let course = course("Databases", "relational algebra and sql");
        let program = program(vec![]);

        assert_eq!(course_relevance(&profile, &course, &program), 0.0);
    }

    #[test]
    fn test_adding_matching_interest_never_decreases_score() {
        let course = course("NLP", "transformers for nlp");
        let program = program(vec![]);

        let base = profile_with(vec!["nlp"], vec![], vec![]);
        let base_score = course_relevance(&base, &course, &program);

        let mut extended = base.clone();
        extended.interests.push("transformers".to_string());
        let extended_score = course_relevance(&extended, &course, &program);

        assert!(extended_score >= base_score);
    }

    #[test]
    fn test_program_skill_overlap_contributes() {
        let profile = profile_with(vec![], vec![], vec![]);
        let course = course("Python Lab", "practical python programming");
        let program = program(vec!["Python"]);

        let score = course_relevance(&profile, &course, &program);
        assert!((score - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_program_match_weights() {
        // One interest in the program text (0.20) and one goal in career
        // text (0.30).
        let mut profile = profile_with(vec!["deep learning"], vec!["ml engineer"], vec![]);
        profile.skills = vec!["python".to_string()];

        let mut target = program(vec![]);
        target.career = vec!["ML Engineer".to_string(), "Researcher".to_string()];

        let score = program_match(&profile, &target);
        assert!((score - 0.50).abs() < 1e-6);
    }

    #[test]
    fn test_program_match_background_against_requirements() {
        let profile = profile_with(vec![], vec![], vec!["computer science"]);

        let mut target = program(vec![]);
        target.requirements = vec![
            "Bachelor's degree in computer science or mathematics".to_string(),
            "English proficiency".to_string(),
        ];

        let score = program_match(&profile, &target);
        assert!((score - 0.15).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_rank_courses_sorted_descending_with_stable_ties() {
        let profile = profile_with(vec!["machine learning"], vec![], vec![]);
        let program = program(vec![]);

        let candidates = vec![
            course("Compilers", "parsing and code generation"),
            course("ML One", "machine learning part one"),
            course("Databases", "relational algebra"),
            course("ML Two", "machine learning part two"),
        ];

        let scorer = LexicalScorer::new();
        let ranked = scorer
            .rank_courses(&profile, &program, &candidates, 10)
            .await
            .unwrap();

        assert_eq!(ranked.len(), 4);
        // Both ML courses score 0.30 and keep their catalog order; the two
        // zero-score courses follow, also in catalog order.
        assert_eq!(ranked[0].course.name, "ML One");
        assert_eq!(ranked[1].course.name, "ML Two");
        assert_eq!(ranked[2].course.name, "Compilers");
        assert_eq!(ranked[3].course.name, "Databases");
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[tokio::test]
    async fn test_rank_courses_limit_edge_cases() {
        let profile = profile_with(vec!["machine learning"], vec![], vec![]);
        let program = program(vec![]);
        let candidates = vec![course("ML", "machine learning")];

        let scorer = LexicalScorer::new();

        let none = scorer
            .rank_courses(&profile, &program, &candidates, 0)
            .await
            .unwrap();
        assert!(none.is_empty());

        let all = scorer
            .rank_courses(&profile, &program, &candidates, 100)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_rank_programs_caps_output() {
        let profile = profile_with(vec!["ai"], vec![], vec![]);

        let catalog: Vec<Program> = (0..15)
            .map(|i| {
                let mut p = program(vec![]);
                p.id = format!("p{:02}", i);
                p
            })
            .collect();

        let scorer = LexicalScorer::new();
        let ranked = scorer.rank_programs(&profile, &catalog).await.unwrap();

        assert_eq!(ranked.len(), PROGRAM_RECOMMENDATION_LIMIT);
    }
}
