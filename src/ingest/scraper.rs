use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    ingest::extract::{first_string, pluck, string_items, text_of},
    models::{Course, CourseKind, Program},
};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const MAX_COURSES: usize = 50;
const MAX_REQUIREMENTS: usize = 10;
const MAX_SKILLS: usize = 20;
const MAX_CAREER: usize = 10;

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="__NEXT_DATA__" type="application/json"[^>]*>(.*?)</script>"#)
        .expect("static regex")
});

/// Result of one ingestion batch
#[derive(Debug, Serialize)]
pub struct IngestSummary {
    pub ingested: usize,
    pub failed: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches program pages and turns their embedded data into catalog records
///
/// Pages embed their content as a `__NEXT_DATA__` JSON blob; fields are
/// probed with the schema-less helpers in `extract`, so layout drift between
/// page revisions degrades to missing fields rather than parse failures.
pub struct ProgramScraper {
    http_client: HttpClient,
}

impl Default for ProgramScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramScraper {
    pub fn new() -> Self {
        Self {
            http_client: HttpClient::new(),
        }
    }

    /// Fetches and parses one program page
    pub async fn fetch_program(&self, url: &str) -> AppResult<Program> {
        let response = self
            .http_client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(url, status = %status, "Program page request failed");
            return Err(AppError::ExternalApi(format!(
                "Page {} returned status {}",
                url, status
            )));
        }

        let html = response.text().await?;

        let next_data = extract_next_data(&html).ok_or_else(|| {
            AppError::ExternalApi(format!("Page {} has no embedded program data", url))
        })?;

        let program = parse_program(&next_data, url);

        tracing::info!(
            url,
            program_id = %program.id,
            courses = program.courses.len(),
            "Parsed program page"
        );

        Ok(program)
    }

    /// Fetches a batch of pages and upserts each parsed program
    ///
    /// Per-URL failures are logged and reported in the summary, never
    /// aborting the batch.
    pub async fn ingest_all(
        &self,
        catalog: &dyn CatalogStore,
        urls: &[String],
    ) -> AppResult<IngestSummary> {
        let mut summary = IngestSummary {
            ingested: 0,
            failed: Vec::new(),
            fetched_at: Utc::now(),
        };

        for url in urls {
            match self.fetch_program(url).await {
                Ok(program) => match catalog.upsert_program(&program).await {
                    Ok(()) => summary.ingested += 1,
                    Err(e) => {
                        tracing::warn!(url, error = %e, "Failed to store scraped program");
                        summary.failed.push(url.clone());
                    }
                },
                Err(e) => {
                    tracing::warn!(url, error = %e, "Failed to scrape program page");
                    summary.failed.push(url.clone());
                }
            }
        }

        tracing::info!(
            ingested = summary.ingested,
            failed = summary.failed.len(),
            "Ingestion batch finished"
        );

        Ok(summary)
    }
}

/// Pulls the `__NEXT_DATA__` JSON blob out of a page
fn extract_next_data(html: &str) -> Option<Value> {
    let captured = NEXT_DATA_RE.captures(html)?.get(1)?.as_str();
    serde_json::from_str(captured).ok()
}

/// Last path segment of the page URL, the program's natural key
fn id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(url)
        .to_string()
}

fn value_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Builds a program record from the embedded page data
///
/// Candidate roots are probed in order; the first root yielding a value for
/// a field wins. Absent fields come back empty.
fn parse_program(next_data: &Value, url: &str) -> Program {
    let roots: Vec<&Value> = [
        pluck(next_data, &["props", "pageProps", "apiProgram"]),
        pluck(next_data, &["props", "pageProps", "program"]),
        pluck(next_data, &["props", "pageProps", "data"]),
    ]
    .into_iter()
    .flatten()
    .collect();

    let title = roots
        .iter()
        .find_map(|root| text_of(root, &["title"]))
        .unwrap_or_else(|| "Unknown program".to_string());

    let description = roots
        .iter()
        .find_map(|root| first_string(root, &["description", "about", "text", "content"], 20))
        .unwrap_or_default();

    let courses = roots
        .iter()
        .map(|root| parse_courses(root))
        .find(|courses| !courses.is_empty())
        .unwrap_or_default();

    let requirements = roots
        .iter()
        .map(|root| {
            string_items(
                root,
                &["requirements", "admission", "entry", "requirementsList"],
                10,
                usize::MAX,
                MAX_REQUIREMENTS,
            )
        })
        .find(|items| !items.is_empty())
        .unwrap_or_default();

    let skills = roots
        .iter()
        .map(|root| {
            string_items(
                root,
                &["skills", "competencies", "outcomes", "results"],
                5,
                100,
                MAX_SKILLS,
            )
        })
        .find(|items| !items.is_empty())
        .unwrap_or_default();

    let career = roots
        .iter()
        .map(|root| {
            string_items(
                root,
                &["career", "jobs", "employment", "opportunities"],
                10,
                usize::MAX,
                MAX_CAREER,
            )
        })
        .find(|items| !items.is_empty())
        .unwrap_or_default();

    Program {
        id: id_from_url(url),
        title,
        url: url.to_string(),
        description,
        courses,
        requirements,
        skills,
        career,
    }
}

/// Courses from the first candidate key holding a non-empty array
fn parse_courses(root: &Value) -> Vec<Course> {
    let Some(map) = root.as_object() else {
        return Vec::new();
    };

    for key in ["courses", "disciplines", "subjects", "items"] {
        let Some(items) = map.get(key).and_then(Value::as_array) else {
            continue;
        };

        let courses: Vec<Course> = items
            .iter()
            .filter_map(|item| {
                let name = text_of(item, &["name", "title", "subject"])?;
                let kind = CourseKind::classify(
                    item.get("type").and_then(Value::as_str).unwrap_or_default(),
                );

                Some(Course {
                    name,
                    kind,
                    credits: value_to_string(item.get("credits")),
                    semester: value_to_string(item.get("semester")),
                    description: String::new(),
                    skills: Vec::new(),
                })
            })
            .take(MAX_COURSES)
            .collect();

        if !courses.is_empty() {
            return courses;
        }
    }

    Vec::new()
}
