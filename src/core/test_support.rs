// In-memory fakes of the remote ports, shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::classroom::{
    ClassroomDirectory, Course, CourseMaterial, CourseState, CourseWork, NewCourse,
    NewCourseMaterial, NewCourseWork, Student, Submission, Topic,
};
use crate::core::grading::SpreadsheetReader;
use crate::core::quiz::{FileStorage, FormHandle, QuizForms, Question};
use crate::core::remote::RemoteError;

fn failure(op: &str) -> RemoteError {
    RemoteError::Api {
        status: 500,
        message: format!("injected failure: {}", op),
    }
}

pub fn course(id: &str, name: &str, state: CourseState) -> Course {
    Course {
        id: id.to_string(),
        name: name.to_string(),
        section: None,
        room: None,
        description_heading: None,
        state,
        enrollment_code: None,
        updated_at: None,
    }
}

pub fn work(id: &str, title: &str, max_points: Option<f64>) -> CourseWork {
    CourseWork {
        id: id.to_string(),
        title: title.to_string(),
        work_type: Some("ASSIGNMENT".to_string()),
        max_points,
        link_urls: Vec::new(),
    }
}

#[derive(Default)]
struct ClassroomState {
    next_id: u32,
    courses: Vec<Course>,
    topics: HashMap<String, Vec<Topic>>,
    work: HashMap<String, Vec<CourseWork>>,
    materials: HashMap<String, Vec<CourseMaterial>>,
    students: HashMap<String, Vec<Student>>,
    submissions: HashMap<(String, String), Vec<Submission>>,
    grades: Vec<(String, String, String, f64)>,
    created_work: Vec<(String, NewCourseWork)>,
    created_materials: Vec<(String, NewCourseMaterial)>,
    state_changes: Vec<(String, CourseState)>,
    failures: HashSet<String>,
}

impl ClassroomState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check(&self, op: &str) -> Result<(), RemoteError> {
        if self.failures.contains(op) {
            Err(failure(op))
        } else {
            Ok(())
        }
    }
}

/// Fake Classroom. Failures are injected per operation key, e.g.
/// `"delete_work:w2"` or `"list_materials:c1"`.
#[derive(Clone, Default)]
pub struct FakeClassroom {
    state: Arc<RwLock<ClassroomState>>,
}

impl FakeClassroom {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_course(&self, course: Course) {
        self.state.write().await.courses.push(course);
    }

    pub async fn add_topic(&self, course_id: &str, topic_id: &str, name: &str) {
        self.state
            .write()
            .await
            .topics
            .entry(course_id.to_string())
            .or_default()
            .push(Topic {
                topic_id: topic_id.to_string(),
                name: name.to_string(),
            });
    }

    pub async fn add_work(&self, course_id: &str, work: CourseWork) {
        self.state
            .write()
            .await
            .work
            .entry(course_id.to_string())
            .or_default()
            .push(work);
    }

    pub async fn add_material(&self, course_id: &str, id: &str, title: &str) {
        self.state
            .write()
            .await
            .materials
            .entry(course_id.to_string())
            .or_default()
            .push(CourseMaterial {
                id: id.to_string(),
                title: title.to_string(),
            });
    }

    pub async fn add_student(&self, course_id: &str, user_id: &str, email: Option<&str>) {
        self.state
            .write()
            .await
            .students
            .entry(course_id.to_string())
            .or_default()
            .push(Student {
                user_id: user_id.to_string(),
                full_name: Some(format!("Student {}", user_id)),
                email: email.map(str::to_string),
            });
    }

    pub async fn add_submission(&self, course_id: &str, work_id: &str, id: &str, user_id: &str) {
        self.state
            .write()
            .await
            .submissions
            .entry((course_id.to_string(), work_id.to_string()))
            .or_default()
            .push(Submission {
                id: id.to_string(),
                user_id: user_id.to_string(),
            });
    }

    pub async fn fail_on(&self, op: &str) {
        self.state.write().await.failures.insert(op.to_string());
    }

    pub async fn grades(&self) -> Vec<(String, String, String, f64)> {
        self.state.read().await.grades.clone()
    }

    pub async fn created_work(&self) -> Vec<(String, NewCourseWork)> {
        self.state.read().await.created_work.clone()
    }

    pub async fn created_materials(&self) -> Vec<(String, NewCourseMaterial)> {
        self.state.read().await.created_materials.clone()
    }

    pub async fn state_changes(&self) -> Vec<(String, CourseState)> {
        self.state.read().await.state_changes.clone()
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.state.read().await.courses.clone()
    }

    pub async fn topics(&self, course_id: &str) -> Vec<Topic> {
        self.state
            .read()
            .await
            .topics
            .get(course_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn remaining_work(&self, course_id: &str) -> usize {
        self.state
            .read()
            .await
            .work
            .get(course_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub async fn remaining_materials(&self, course_id: &str) -> usize {
        self.state
            .read()
            .await
            .materials
            .get(course_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ClassroomDirectory for FakeClassroom {
    async fn list_courses(&self, states: &[CourseState]) -> Result<Vec<Course>, RemoteError> {
        let state = self.state.read().await;
        state.check("list_courses")?;
        Ok(state
            .courses
            .iter()
            .filter(|c| states.is_empty() || states.contains(&c.state))
            .cloned()
            .collect())
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("get_course:{}", course_id))?;
        state
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("course {}", course_id)))
    }

    async fn create_course(&self, new: &NewCourse) -> Result<Course, RemoteError> {
        let mut state = self.state.write().await;
        state.check("create_course")?;
        let id = state.next("course");
        let created = Course {
            id: id.clone(),
            name: new.name.clone(),
            section: new.section.clone(),
            room: new.room.clone(),
            description_heading: new.description_heading.clone(),
            state: new.state,
            enrollment_code: Some(format!("code-{}", id)),
            updated_at: None,
        };
        state.courses.push(created.clone());
        Ok(created)
    }

    async fn update_course_state(
        &self,
        course_id: &str,
        new_state: CourseState,
    ) -> Result<Course, RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("update_course_state:{}", course_id))?;
        state
            .state_changes
            .push((course_id.to_string(), new_state));
        let course = state
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| RemoteError::NotFound(format!("course {}", course_id)))?;
        course.state = new_state;
        Ok(course.clone())
    }

    async fn delete_course(&self, course_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("delete_course:{}", course_id))?;
        let before = state.courses.len();
        state.courses.retain(|c| c.id != course_id);
        if state.courses.len() == before {
            return Err(RemoteError::NotFound(format!("course {}", course_id)));
        }
        Ok(())
    }

    async fn list_topics(&self, course_id: &str) -> Result<Vec<Topic>, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("list_topics:{}", course_id))?;
        Ok(state.topics.get(course_id).cloned().unwrap_or_default())
    }

    async fn create_topic(&self, course_id: &str, name: &str) -> Result<Topic, RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("create_topic:{}", name))?;
        let topic = Topic {
            topic_id: state.next("topic"),
            name: name.to_string(),
        };
        state
            .topics
            .entry(course_id.to_string())
            .or_default()
            .push(topic.clone());
        Ok(topic)
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("list_work:{}", course_id))?;
        Ok(state.work.get(course_id).cloned().unwrap_or_default())
    }

    async fn create_course_work(
        &self,
        course_id: &str,
        new: &NewCourseWork,
    ) -> Result<CourseWork, RemoteError> {
        let mut state = self.state.write().await;
        state.check("create_work")?;
        let created = CourseWork {
            id: state.next("work"),
            title: new.title.clone(),
            work_type: Some("ASSIGNMENT".to_string()),
            max_points: Some(new.max_points),
            link_urls: new.link.iter().map(|l| l.url.clone()).collect(),
        };
        state
            .created_work
            .push((course_id.to_string(), new.clone()));
        state
            .work
            .entry(course_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn delete_course_work(&self, course_id: &str, work_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("delete_work:{}", work_id))?;
        if let Some(items) = state.work.get_mut(course_id) {
            items.retain(|w| w.id != work_id);
        }
        Ok(())
    }

    async fn list_materials(&self, course_id: &str) -> Result<Vec<CourseMaterial>, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("list_materials:{}", course_id))?;
        Ok(state.materials.get(course_id).cloned().unwrap_or_default())
    }

    async fn create_material(
        &self,
        course_id: &str,
        new: &NewCourseMaterial,
    ) -> Result<CourseMaterial, RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("create_material:{}", new.title))?;
        let created = CourseMaterial {
            id: state.next("material"),
            title: new.title.clone(),
        };
        state
            .created_materials
            .push((course_id.to_string(), new.clone()));
        state
            .materials
            .entry(course_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn delete_material(
        &self,
        course_id: &str,
        material_id: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("delete_material:{}", material_id))?;
        if let Some(items) = state.materials.get_mut(course_id) {
            items.retain(|m| m.id != material_id);
        }
        Ok(())
    }

    async fn list_students(&self, course_id: &str) -> Result<Vec<Student>, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("list_students:{}", course_id))?;
        Ok(state.students.get(course_id).cloned().unwrap_or_default())
    }

    async fn list_submissions(
        &self,
        course_id: &str,
        work_id: &str,
    ) -> Result<Vec<Submission>, RemoteError> {
        let state = self.state.read().await;
        state.check(&format!("list_submissions:{}", work_id))?;
        Ok(state
            .submissions
            .get(&(course_id.to_string(), work_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn grade_submission(
        &self,
        course_id: &str,
        work_id: &str,
        submission_id: &str,
        grade: f64,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.write().await;
        state.check(&format!("grade:{}", submission_id))?;
        state.grades.push((
            course_id.to_string(),
            work_id.to_string(),
            submission_id.to_string(),
            grade,
        ));
        Ok(())
    }
}

#[derive(Default)]
struct FormsState {
    created: u32,
    added: Vec<(String, Vec<Question>)>,
}

#[derive(Clone, Default)]
pub struct FakeForms {
    state: Arc<RwLock<FormsState>>,
}

impl FakeForms {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn added(&self) -> Vec<(String, Vec<Question>)> {
        self.state.read().await.added.clone()
    }

    pub async fn created_count(&self) -> u32 {
        self.state.read().await.created
    }
}

#[async_trait]
impl QuizForms for FakeForms {
    async fn create_form(&self, _title: &str) -> Result<FormHandle, RemoteError> {
        let mut state = self.state.write().await;
        state.created += 1;
        Ok(FormHandle {
            form_id: format!("form-{}", state.created),
            responder_uri: None,
        })
    }

    async fn add_questions(
        &self,
        form_id: &str,
        questions: &[Question],
    ) -> Result<(), RemoteError> {
        self.state
            .write()
            .await
            .added
            .push((form_id.to_string(), questions.to_vec()));
        Ok(())
    }

    async fn responder_uri(&self, form_id: &str) -> Result<Option<String>, RemoteError> {
        Ok(Some(format!(
            "https://docs.google.com/forms/d/e/{}/viewform",
            form_id
        )))
    }
}

#[derive(Default)]
struct StorageState {
    shared: Vec<String>,
    uploads: Vec<(PathBuf, String, Option<String>)>,
    fail_sharing: bool,
    fail_uploads: bool,
}

#[derive(Clone, Default)]
pub struct FakeStorage {
    state: Arc<RwLock<StorageState>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_sharing(&self) {
        self.state.write().await.fail_sharing = true;
    }

    pub async fn fail_uploads(&self) {
        self.state.write().await.fail_uploads = true;
    }

    pub async fn shared(&self) -> Vec<String> {
        self.state.read().await.shared.clone()
    }

    pub async fn uploads(&self) -> Vec<(PathBuf, String, Option<String>)> {
        self.state.read().await.uploads.clone()
    }
}

#[async_trait]
impl FileStorage for FakeStorage {
    async fn share_with_anyone(&self, file_id: &str) -> Result<(), RemoteError> {
        let mut state = self.state.write().await;
        if state.fail_sharing {
            return Err(failure("share"));
        }
        state.shared.push(file_id.to_string());
        Ok(())
    }

    async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        folder_id: Option<&str>,
    ) -> Result<String, RemoteError> {
        let mut state = self.state.write().await;
        if state.fail_uploads {
            return Err(failure("upload"));
        }
        state.uploads.push((
            path.to_path_buf(),
            mime_type.to_string(),
            folder_id.map(str::to_string),
        ));
        Ok(format!("file-{}", state.uploads.len()))
    }
}

/// Fake spreadsheet keyed by A1 range.
#[derive(Clone, Default)]
pub struct FakeSheet {
    ranges: Arc<RwLock<HashMap<String, Vec<Vec<String>>>>>,
}

impl FakeSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_range(&self, range: &str, rows: &[&[&str]]) {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        self.ranges.write().await.insert(range.to_string(), rows);
    }
}

#[async_trait]
impl SpreadsheetReader for FakeSheet {
    async fn read_range(
        &self,
        _sheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, RemoteError> {
        Ok(self
            .ranges
            .read()
            .await
            .get(range)
            .cloned()
            .unwrap_or_default())
    }
}
