use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::google_api::{GoogleApi, Paged};
use crate::core::classroom::{
    ClassroomDirectory, Course, CourseMaterial, CourseState, CourseWork, NewCourse,
    NewCourseMaterial, NewCourseWork, Student, Submission, Topic,
};
use crate::core::remote::RemoteError;

const CLASSROOM_BASE: &str = "https://classroom.googleapis.com/v1";
const PAGE_SIZE: &str = "100";

/// Google Classroom v1 client. Every listing goes through `GoogleApi::list_all`.
pub struct ClassroomApiClient {
    api: GoogleApi,
    base_url: String,
}

impl ClassroomApiClient {
    pub fn new(api: GoogleApi) -> Self {
        Self {
            api,
            base_url: CLASSROOM_BASE.to_string(),
        }
    }

    fn course_url(&self, course_id: &str) -> String {
        format!("{}/courses/{}", self.base_url, course_id)
    }

    fn paged_query() -> Vec<(&'static str, String)> {
        vec![("pageSize", PAGE_SIZE.to_string())]
    }

    fn map_course(api: ApiCourse) -> Course {
        Course {
            state: api
                .course_state
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CourseState::Active),
            id: api.id,
            name: api.name.unwrap_or_else(|| "(untitled course)".to_string()),
            section: api.section,
            room: api.room,
            description_heading: api.description_heading,
            enrollment_code: api.enrollment_code,
            updated_at: api
                .update_time
                .as_deref()
                .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn map_course_work(api: ApiCourseWork) -> CourseWork {
        CourseWork {
            id: api.id,
            title: api.title.unwrap_or_else(|| "(untitled)".to_string()),
            work_type: api.work_type,
            max_points: api.max_points,
            link_urls: api
                .materials
                .into_iter()
                .filter_map(|m| m.link.map(|l| l.url))
                .collect(),
        }
    }

    fn map_student(api: ApiStudent) -> Student {
        let profile = api.profile.unwrap_or_default();
        Student {
            user_id: api.user_id,
            full_name: profile.name.and_then(|n| n.full_name),
            email: profile.email_address,
        }
    }
}

#[async_trait]
impl ClassroomDirectory for ClassroomApiClient {
    async fn list_courses(&self, states: &[CourseState]) -> Result<Vec<Course>, RemoteError> {
        let mut query = Self::paged_query();
        for state in states {
            query.push(("courseStates", state.as_api_str().to_string()));
        }

        let url = format!("{}/courses", self.base_url);
        let courses = self.api.list_all::<CoursePage>(&url, &query).await?;
        Ok(courses.into_iter().map(Self::map_course).collect())
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError> {
        let api: ApiCourse = self.api.get_json(&self.course_url(course_id), &[]).await?;
        Ok(Self::map_course(api))
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course, RemoteError> {
        let body = ApiNewCourse {
            name: &course.name,
            section: course.section.as_deref(),
            room: course.room.as_deref(),
            description_heading: course.description_heading.as_deref(),
            owner_id: "me",
            course_state: course.state.as_api_str(),
        };
        let url = format!("{}/courses", self.base_url);
        let api: ApiCourse = self.api.post_json(&url, &body).await?;
        Ok(Self::map_course(api))
    }

    async fn update_course_state(
        &self,
        course_id: &str,
        state: CourseState,
    ) -> Result<Course, RemoteError> {
        let api: ApiCourse = self
            .api
            .patch_json(
                &self.course_url(course_id),
                &[("updateMask", "courseState".to_string())],
                &json!({ "courseState": state.as_api_str() }),
            )
            .await?;
        Ok(Self::map_course(api))
    }

    async fn delete_course(&self, course_id: &str) -> Result<(), RemoteError> {
        self.api.delete(&self.course_url(course_id)).await
    }

    async fn list_topics(&self, course_id: &str) -> Result<Vec<Topic>, RemoteError> {
        let url = format!("{}/topics", self.course_url(course_id));
        let topics = self
            .api
            .list_all::<TopicPage>(&url, &Self::paged_query())
            .await?;
        Ok(topics
            .into_iter()
            .map(|t| Topic {
                topic_id: t.topic_id,
                name: t.name.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_topic(&self, course_id: &str, name: &str) -> Result<Topic, RemoteError> {
        let url = format!("{}/topics", self.course_url(course_id));
        let api: ApiTopic = self.api.post_json(&url, &json!({ "name": name })).await?;
        Ok(Topic {
            topic_id: api.topic_id,
            name: api.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, RemoteError> {
        let url = format!("{}/courseWork", self.course_url(course_id));
        let works = self
            .api
            .list_all::<CourseWorkPage>(&url, &Self::paged_query())
            .await?;
        Ok(works.into_iter().map(Self::map_course_work).collect())
    }

    async fn create_course_work(
        &self,
        course_id: &str,
        work: &NewCourseWork,
    ) -> Result<CourseWork, RemoteError> {
        let materials: Vec<_> = work
            .link
            .iter()
            .map(|l| json!({ "link": { "url": l.url, "title": l.title } }))
            .collect();

        let mut body = json!({
            "title": work.title,
            "description": work.description,
            "materials": materials,
            "workType": "ASSIGNMENT",
            "state": "PUBLISHED",
            "maxPoints": work.max_points,
        });
        if let Some(topic_id) = &work.topic_id {
            body["topicId"] = json!(topic_id);
        }

        let url = format!("{}/courseWork", self.course_url(course_id));
        let api: ApiCourseWork = self.api.post_json(&url, &body).await?;
        Ok(Self::map_course_work(api))
    }

    async fn delete_course_work(&self, course_id: &str, work_id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/courseWork/{}", self.course_url(course_id), work_id);
        self.api.delete(&url).await
    }

    async fn list_materials(&self, course_id: &str) -> Result<Vec<CourseMaterial>, RemoteError> {
        let url = format!("{}/courseWorkMaterials", self.course_url(course_id));
        let materials = self
            .api
            .list_all::<MaterialPage>(&url, &Self::paged_query())
            .await?;
        Ok(materials
            .into_iter()
            .map(|m| CourseMaterial {
                id: m.id,
                title: m.title.unwrap_or_default(),
            })
            .collect())
    }

    async fn create_material(
        &self,
        course_id: &str,
        material: &NewCourseMaterial,
    ) -> Result<CourseMaterial, RemoteError> {
        let mut body = json!({
            "title": material.title,
            "description": material.description,
            "materials": [
                { "driveFile": { "driveFile": { "id": material.drive_file_id } } }
            ],
            "state": "PUBLISHED",
        });
        if let Some(topic_id) = &material.topic_id {
            body["topicId"] = json!(topic_id);
        }

        let url = format!("{}/courseWorkMaterials", self.course_url(course_id));
        let api: ApiMaterial = self.api.post_json(&url, &body).await?;
        Ok(CourseMaterial {
            id: api.id,
            title: api.title.unwrap_or_else(|| material.title.clone()),
        })
    }

    async fn delete_material(&self, course_id: &str, material_id: &str) -> Result<(), RemoteError> {
        let url = format!(
            "{}/courseWorkMaterials/{}",
            self.course_url(course_id),
            material_id
        );
        self.api.delete(&url).await
    }

    async fn list_students(&self, course_id: &str) -> Result<Vec<Student>, RemoteError> {
        let url = format!("{}/students", self.course_url(course_id));
        let students = self
            .api
            .list_all::<StudentPage>(&url, &Self::paged_query())
            .await?;
        Ok(students.into_iter().map(Self::map_student).collect())
    }

    async fn list_submissions(
        &self,
        course_id: &str,
        work_id: &str,
    ) -> Result<Vec<Submission>, RemoteError> {
        let url = format!(
            "{}/courseWork/{}/studentSubmissions",
            self.course_url(course_id),
            work_id
        );
        let submissions = self
            .api
            .list_all::<SubmissionPage>(&url, &Self::paged_query())
            .await?;
        Ok(submissions
            .into_iter()
            .filter_map(|s| {
                s.user_id.map(|user_id| Submission {
                    id: s.id,
                    user_id,
                })
            })
            .collect())
    }

    async fn grade_submission(
        &self,
        course_id: &str,
        work_id: &str,
        submission_id: &str,
        grade: f64,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/courseWork/{}/studentSubmissions/{}",
            self.course_url(course_id),
            work_id,
            submission_id
        );
        let _: serde_json::Value = self
            .api
            .patch_json(
                &url,
                &[("updateMask", "draftGrade,assignedGrade".to_string())],
                &json!({ "draftGrade": grade, "assignedGrade": grade }),
            )
            .await?;
        Ok(())
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiNewCourse<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    room: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_heading: Option<&'a str>,
    owner_id: &'a str,
    course_state: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCourse {
    id: String,
    name: Option<String>,
    section: Option<String>,
    room: Option<String>,
    description_heading: Option<String>,
    course_state: Option<String>,
    enrollment_code: Option<String>,
    update_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoursePage {
    #[serde(default)]
    courses: Vec<ApiCourse>,
    next_page_token: Option<String>,
}

impl Paged for CoursePage {
    type Item = ApiCourse;

    fn into_page(self) -> (Vec<ApiCourse>, Option<String>) {
        (self.courses, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTopic {
    topic_id: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicPage {
    #[serde(default)]
    topic: Vec<ApiTopic>,
    next_page_token: Option<String>,
}

impl Paged for TopicPage {
    type Item = ApiTopic;

    fn into_page(self) -> (Vec<ApiTopic>, Option<String>) {
        (self.topic, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiMaterialRef {
    link: Option<ApiLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCourseWork {
    id: String,
    title: Option<String>,
    work_type: Option<String>,
    max_points: Option<f64>,
    #[serde(default)]
    materials: Vec<ApiMaterialRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseWorkPage {
    #[serde(default)]
    course_work: Vec<ApiCourseWork>,
    next_page_token: Option<String>,
}

impl Paged for CourseWorkPage {
    type Item = ApiCourseWork;

    fn into_page(self) -> (Vec<ApiCourseWork>, Option<String>) {
        (self.course_work, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
struct ApiMaterial {
    id: String,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialPage {
    #[serde(default)]
    course_work_material: Vec<ApiMaterial>,
    next_page_token: Option<String>,
}

impl Paged for MaterialPage {
    type Item = ApiMaterial;

    fn into_page(self) -> (Vec<ApiMaterial>, Option<String>) {
        (self.course_work_material, self.next_page_token)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiName {
    full_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProfile {
    name: Option<ApiName>,
    email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiStudent {
    user_id: String,
    profile: Option<ApiProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentPage {
    #[serde(default)]
    students: Vec<ApiStudent>,
    next_page_token: Option<String>,
}

impl Paged for StudentPage {
    type Item = ApiStudent;

    fn into_page(self) -> (Vec<ApiStudent>, Option<String>) {
        (self.students, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSubmission {
    id: String,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionPage {
    #[serde(default)]
    student_submissions: Vec<ApiSubmission>,
    next_page_token: Option<String>,
}

impl Paged for SubmissionPage {
    type Item = ApiSubmission;

    fn into_page(self) -> (Vec<ApiSubmission>, Option<String>) {
        (self.student_submissions, self.next_page_token)
    }
}
