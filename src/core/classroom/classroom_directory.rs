use async_trait::async_trait;

use super::classroom_models::{
    Course, CourseMaterial, CourseState, CourseWork, NewCourse, NewCourseMaterial, NewCourseWork,
    Student, Submission, Topic,
};
use crate::core::remote::RemoteError;

/// Everything the tools need from Google Classroom.
///
/// Every `list_*` call returns the complete list; paging is the
/// implementation's business.
#[async_trait]
pub trait ClassroomDirectory: Send + Sync {
    async fn list_courses(&self, states: &[CourseState]) -> Result<Vec<Course>, RemoteError>;
    async fn get_course(&self, course_id: &str) -> Result<Course, RemoteError>;
    async fn create_course(&self, course: &NewCourse) -> Result<Course, RemoteError>;
    async fn update_course_state(
        &self,
        course_id: &str,
        state: CourseState,
    ) -> Result<Course, RemoteError>;
    /// Permanent. The API only accepts it for archived courses.
    async fn delete_course(&self, course_id: &str) -> Result<(), RemoteError>;

    async fn list_topics(&self, course_id: &str) -> Result<Vec<Topic>, RemoteError>;
    async fn create_topic(&self, course_id: &str, name: &str) -> Result<Topic, RemoteError>;

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, RemoteError>;
    async fn create_course_work(
        &self,
        course_id: &str,
        work: &NewCourseWork,
    ) -> Result<CourseWork, RemoteError>;
    async fn delete_course_work(&self, course_id: &str, work_id: &str) -> Result<(), RemoteError>;

    async fn list_materials(&self, course_id: &str) -> Result<Vec<CourseMaterial>, RemoteError>;
    async fn create_material(
        &self,
        course_id: &str,
        material: &NewCourseMaterial,
    ) -> Result<CourseMaterial, RemoteError>;
    async fn delete_material(&self, course_id: &str, material_id: &str)
        -> Result<(), RemoteError>;

    async fn list_students(&self, course_id: &str) -> Result<Vec<Student>, RemoteError>;
    async fn list_submissions(
        &self,
        course_id: &str,
        work_id: &str,
    ) -> Result<Vec<Submission>, RemoteError>;
    /// Sets both the draft and the assigned grade.
    async fn grade_submission(
        &self,
        course_id: &str,
        work_id: &str,
        submission_id: &str,
        grade: f64,
    ) -> Result<(), RemoteError>;
}
