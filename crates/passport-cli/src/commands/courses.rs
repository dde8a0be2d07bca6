//! `passport courses` — List catalog courses.

use clap::Args;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct CoursesArgs {
    /// Show the lessons of one course.
    pub course: Option<String>,
}

pub fn run(ctx: &Context, args: &CoursesArgs) -> anyhow::Result<()> {
    let Some(course_id) = &args.course else {
        for course in ctx.catalog.courses() {
            println!(
                "{:<22} {:<36} {:<12} {} lessons, {} min",
                course.id,
                course.title,
                course.category,
                course.total_lessons(),
                course.duration_minutes
            );
        }
        return Ok(());
    };

    let course = ctx.course(course_id)?;
    println!("{} ({})", course.title, course.id);
    println!("  {}", course.description);
    println!("  Institution:   {}, {}", course.institution, course.country);
    println!("  Instructor:    {}", course.instructor);
    println!("  Credential:    {} [{}]", course.credential_type, course.credential_symbol());
    println!("  Passing score: {}%", course.passing_score);
    println!("  Lessons:");
    for lesson in course.ordered_lessons() {
        println!(
            "    {}. {:<10} {} ({} min, {} questions)",
            lesson.order,
            lesson.id,
            lesson.title,
            lesson.duration_minutes,
            lesson.quiz.len()
        );
    }
    Ok(())
}
