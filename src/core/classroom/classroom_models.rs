// Classroom domain models.
// These mirror only the parts of the Classroom API payloads the tools use; the
// infra layer maps wire JSON into them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Lifecycle state of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseState {
    Active,
    Archived,
    Provisioned,
    Declined,
    Suspended,
}

impl CourseState {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            CourseState::Active => "ACTIVE",
            CourseState::Archived => "ARCHIVED",
            CourseState::Provisioned => "PROVISIONED",
            CourseState::Declined => "DECLINED",
            CourseState::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for CourseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for CourseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(CourseState::Active),
            "ARCHIVED" => Ok(CourseState::Archived),
            "PROVISIONED" => Ok(CourseState::Provisioned),
            "DECLINED" => Ok(CourseState::Declined),
            "SUSPENDED" => Ok(CourseState::Suspended),
            other => Err(format!("unknown course state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub section: Option<String>,
    pub room: Option<String>,
    pub description_heading: Option<String>,
    pub state: CourseState,
    pub enrollment_code: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields for a course to create. The owner is always the authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub name: String,
    pub section: Option<String>,
    pub room: Option<String>,
    pub description_heading: Option<String>,
    pub state: CourseState,
}

impl NewCourse {
    pub fn active(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section: None,
            room: None,
            description_heading: None,
            state: CourseState::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub topic_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseWork {
    pub id: String,
    pub title: String,
    /// `ASSIGNMENT`, `SHORT_ANSWER_QUESTION`, ...
    pub work_type: Option<String>,
    pub max_points: Option<f64>,
    /// URLs of link materials attached to the coursework.
    pub link_urls: Vec<String>,
}

impl CourseWork {
    /// Ids of Google Forms linked from this coursework.
    pub fn linked_form_ids(&self) -> Vec<String> {
        self.link_urls
            .iter()
            .filter_map(|url| extract_form_id(url))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkMaterial {
    pub url: String,
    pub title: String,
}

/// A published assignment to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourseWork {
    pub title: String,
    pub description: String,
    pub link: Option<LinkMaterial>,
    pub topic_id: Option<String>,
    pub max_points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseMaterial {
    pub id: String,
    pub title: String,
}

/// A published course material backed by a Drive file.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourseMaterial {
    pub title: String,
    pub description: String,
    pub drive_file_id: String,
    pub topic_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub user_id: String,
    pub full_name: Option<String>,
    /// The API hides the address for some accounts.
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: String,
    pub user_id: String,
}

fn form_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/forms/d/(?:e/)?([a-zA-Z0-9_-]+)/").expect("Invalid form url regex"))
}

/// Extracts the form id from a Google Forms URL.
pub fn extract_form_id(url: &str) -> Option<String> {
    if !url.contains("docs.google.com/forms") {
        return None;
    }
    form_url_regex()
        .captures(url)
        .map(|caps| caps[1].to_string())
}
