pub mod classroom_directory;
pub mod classroom_models;

pub use classroom_directory::ClassroomDirectory;
pub use classroom_models::{
    extract_form_id, Course, CourseMaterial, CourseState, CourseWork, LinkMaterial, NewCourse,
    NewCourseMaterial, NewCourseWork, Student, Submission, Topic,
};
