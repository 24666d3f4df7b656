// Course management commands: list, create, remove, roster.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::prompts::Prompter;
use crate::core::classroom::{ClassroomDirectory, Course, CourseState, NewCourse, Student};
use crate::core::courses::{ArchiveOutcome, CourseService, RemovalReport};
use crate::infra::google::{ClassroomApiClient, GoogleApi};

#[derive(Args, Debug)]
pub struct ListCoursesArgs {
    /// Only courses in this state (repeatable)
    #[arg(long = "state", value_name = "STATE")]
    pub states: Vec<CourseState>,
}

#[derive(Args, Debug)]
pub struct CreateCourseArgs {
    /// Course name; prompts for several courses when absent
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub section: Option<String>,

    #[arg(long)]
    pub room: Option<String>,

    /// Description heading shown on the course page
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveCoursesArgs {
    /// Ids of the courses to remove
    #[arg(required = true)]
    pub course_ids: Vec<String>,

    /// Archive only; do not delete
    #[arg(long)]
    pub archive_only: bool,
}

#[derive(Args, Debug)]
pub struct ListStudentsArgs {
    /// Course to show (prompted when absent)
    #[arg(long)]
    pub course_id: Option<String>,
}

fn service(api: GoogleApi) -> CourseService<ClassroomApiClient> {
    CourseService::new(ClassroomApiClient::new(api))
}

fn course_line(course: &Course) -> String {
    let mut line = format!("{} | {} | {}", course.id, course.name, course.state);
    for extra in [&course.section, &course.room].into_iter().flatten() {
        line.push_str(&format!(" | {}", extra));
    }
    if let Some(updated) = course.updated_at {
        line.push_str(&format!(" | updated {}", updated.format("%Y-%m-%d")));
    }
    line
}

fn student_line(student: &Student) -> String {
    format!(
        "{} | {} | {}",
        student.full_name.as_deref().unwrap_or("(no name)"),
        student.email.as_deref().unwrap_or("hidden"),
        student.user_id
    )
}

fn removal_line(report: &RemovalReport) -> String {
    let archived = match &report.archive {
        Ok(ArchiveOutcome::Archived) => "archived".to_string(),
        Ok(ArchiveOutcome::AlreadyArchived) => "already archived".to_string(),
        Err(e) => format!("archive failed: {}", e),
    };
    match &report.delete {
        None => format!("{}: {}", report.course_id, archived),
        Some(Ok(())) => format!("{}: {}, deleted", report.course_id, archived),
        Some(Err(e)) => format!("{}: {}, delete failed: {}", report.course_id, archived, e),
    }
}

/// Numbered pick among the ACTIVE courses. Shared by every command that
/// needs a course when `--course-id` is absent.
pub async fn pick_active_course<C, R, W>(
    courses: &CourseService<C>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<String>
where
    C: ClassroomDirectory,
    R: BufRead,
    W: Write,
{
    let active = courses
        .list_courses(&[CourseState::Active])
        .await
        .context("Failed to list courses")?;
    match prompter.select_course(&active)? {
        Some(course) => Ok(course.id.clone()),
        None => bail!("No course selected"),
    }
}

/// One course from the interactive loop; `None` once the name is left empty.
fn prompt_new_course<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> std::io::Result<Option<NewCourse>> {
    let name = match prompter.ask("Course name: ")? {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };
    let section = non_empty(prompter.ask("Section (optional): ")?);
    let room = non_empty(prompter.ask("Room (optional): ")?);
    let description = non_empty(prompter.ask("Short description (optional): ")?);

    Ok(Some(NewCourse {
        section,
        room,
        description_heading: description,
        ..NewCourse::active(name)
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn list(args: ListCoursesArgs, api: GoogleApi) -> anyhow::Result<()> {
    let courses = service(api)
        .list_courses(&args.states)
        .await
        .context("Failed to list courses")?;

    if courses.is_empty() {
        println!("No courses found.");
        return Ok(());
    }
    for course in &courses {
        println!("{}", course_line(course));
    }
    println!("{} course(s).", courses.len());
    Ok(())
}

pub async fn create(args: CreateCourseArgs, api: GoogleApi) -> anyhow::Result<()> {
    let courses = service(api);

    if let Some(name) = args.name {
        let course = NewCourse {
            section: non_empty(args.section),
            room: non_empty(args.room),
            description_heading: non_empty(args.description),
            ..NewCourse::active(name.trim())
        };
        let created = courses
            .create_course(course)
            .await
            .context("Failed to create course")?;
        print_created(&created);
        return Ok(());
    }

    let mut prompter = Prompter::stdio();
    prompter.say("Enter course names; an empty name finishes.")?;
    while let Some(course) = prompt_new_course(&mut prompter)? {
        // Keep going after a failure so the remaining names are not lost.
        match courses.create_course(course).await {
            Ok(created) => print_created(&created),
            Err(e) => println!("Failed to create course: {}", e),
        }
    }
    Ok(())
}

fn print_created(course: &Course) {
    println!("Created course '{}' (ID {})", course.name, course.id);
    if let Some(heading) = &course.description_heading {
        println!("Description: {}", heading);
    }
    if let Some(code) = &course.enrollment_code {
        println!("Enrollment code: {}", code);
    }
}

pub async fn remove(args: RemoveCoursesArgs, api: GoogleApi) -> anyhow::Result<()> {
    let reports = service(api)
        .remove_courses(&args.course_ids, args.archive_only)
        .await;

    for report in &reports {
        println!("{}", removal_line(report));
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    if failed > 0 {
        bail!("{} of {} course(s) could not be removed", failed, reports.len());
    }
    Ok(())
}

pub async fn students(args: ListStudentsArgs, api: GoogleApi) -> anyhow::Result<()> {
    let courses = service(api);

    let course_id = match args.course_id {
        Some(id) => id,
        None => pick_active_course(&courses, &mut Prompter::stdio()).await?,
    };

    let roster = courses
        .list_students(&course_id)
        .await
        .with_context(|| format!("Failed to list students of course {}", course_id))?;

    if roster.is_empty() {
        println!("No students enrolled.");
        return Ok(());
    }
    for student in &roster {
        println!("{}", student_line(student));
    }
    println!("{} student(s).", roster.len());
    Ok(())
}
