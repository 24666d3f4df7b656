// The core module contains all business logic.
// Each administrative task gets its own submodule; remote services are
// reached only through the port traits defined here.

#[path = "remote_error.rs"]
pub mod remote;

#[path = "classroom/mod.rs"]
pub mod classroom;

#[path = "quiz/mod.rs"]
pub mod quiz;

#[path = "grading/mod.rs"]
pub mod grading;

#[path = "courses/course_service.rs"]
pub mod courses;

#[path = "cleanup/cleanup_service.rs"]
pub mod cleanup;

#[path = "training/mod.rs"]
pub mod training;

#[path = "slides/mod.rs"]
pub mod slides;

#[cfg(test)]
#[path = "test_support.rs"]
pub mod test_support;
