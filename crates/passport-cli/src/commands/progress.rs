//! `passport progress` — Local course progress and credential claims.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use passport_client::claim_course_credential;
use passport_core::{Course, CourseProgress};
use passport_progress::{ProgressRepository, ProgressTracker};

use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    /// Enroll in a course.
    Enroll(CourseArgs),
    /// Record a completed lesson with its quiz score.
    Lesson(LessonArgs),
    /// Answer a lesson quiz; a passing score completes the lesson.
    Quiz(QuizArgs),
    /// Mark a course completed.
    Complete(CompleteArgs),
    /// Mint the course credential to the wallet.
    Claim(CourseArgs),
    /// Show progress for one course or all enrolled courses.
    Show(ShowArgs),
    /// Merge progress exported with `show --json`.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct CourseArgs {
    pub course: String,
}

#[derive(Args, Debug)]
pub struct LessonArgs {
    pub course: String,
    pub lesson: String,

    /// Quiz score, 0 to 100.
    #[arg(long, default_value_t = 100)]
    pub score: u8,
}

#[derive(Args, Debug)]
pub struct QuizArgs {
    pub course: String,
    pub lesson: String,

    /// Chosen option index per question, comma-separated (e.g. 1,0,2).
    #[arg(value_delimiter = ',', required = true)]
    pub answers: Vec<usize>,
}

#[derive(Args, Debug)]
pub struct CompleteArgs {
    pub course: String,

    /// Complete without checking that every lesson passed.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub course: Option<String>,

    /// Print the stored records as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file of progress records keyed by course id.
    pub path: PathBuf,
}

pub async fn run(ctx: &Context, cmd: &ProgressCommand) -> anyhow::Result<()> {
    let tracker = ctx.tracker()?;

    match cmd {
        ProgressCommand::Enroll(args) => {
            let course = ctx.course(&args.course)?;
            let progress = tracker.enroll(&course.id)?;
            println!("Enrolled in {} ({})", course.title, course.id);
            print_summary(course, &progress);
        }
        ProgressCommand::Lesson(args) => {
            let course = ctx.course(&args.course)?;
            if course.lesson(&args.lesson).is_none() {
                anyhow::bail!("unknown lesson {} in course {}", args.lesson, course.id);
            }
            let progress = tracker.complete_lesson(&course.id, &args.lesson, args.score)?;
            println!("Lesson {} completed with score {}", args.lesson, args.score);
            print_summary(course, &progress);
        }
        ProgressCommand::Quiz(args) => {
            let course = ctx.course(&args.course)?;
            let result = tracker.submit_quiz(course, &args.lesson, &args.answers)?;
            println!(
                "Score: {}% ({}/{} correct), passing score {}%",
                result.score, result.correct, result.total, course.passing_score
            );
            if result.passed {
                println!("Passed! Lesson {} completed.", args.lesson);
            } else {
                println!("Not passed. Review the lesson and try again.");
            }
            if let Some(progress) = tracker.course_progress(&course.id)? {
                print_summary(course, &progress);
            }
        }
        ProgressCommand::Complete(args) => {
            let course = ctx.course(&args.course)?;
            let progress = if args.force {
                tracker.complete_course(&course.id)?
            } else {
                tracker.try_complete_course(course)?
            };
            println!("Course {} completed!", course.title);
            print_summary(course, &progress);
            println!("Claim your credential: passport progress claim {}", course.id);
        }
        ProgressCommand::Claim(args) => {
            let course = ctx.course(&args.course)?;
            let program = ctx.signer()?;
            let outcome = claim_course_credential(&program, &tracker, course).await?;

            println!("Credential claimed for {}!", course.title);
            println!("  Transaction:    {}", outcome.response.signature);
            println!("  Credential PDA: {}", outcome.response.credential_mint);
            println!("  Mint:           {}", outcome.response.mint);
            println!("  Explorer:       {}", ctx.tx_link(&outcome.response.signature));
        }
        ProgressCommand::Show(args) => show(ctx, &tracker, args)?,
        ProgressCommand::Import(args) => {
            let json = std::fs::read_to_string(&args.path)?;
            let count = tracker.import_json(&json)?;
            println!("Imported {} course records from {}", count, args.path.display());
        }
    }

    Ok(())
}

fn show<R: ProgressRepository>(
    ctx: &Context,
    tracker: &ProgressTracker<R>,
    args: &ShowArgs,
) -> anyhow::Result<()> {
    match (&args.course, args.json) {
        (None, true) => println!("{}", tracker.export_json()?),
        (Some(course_id), true) => {
            let progress = tracker.course_progress(course_id)?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        (Some(course_id), false) => {
            let course = ctx.course(course_id)?;
            match tracker.course_progress(&course.id)? {
                Some(progress) => print_summary(course, &progress),
                None => println!("Not enrolled in {}", course.id),
            }
        }
        (None, false) => {
            let all = tracker.all_progress()?;
            if all.is_empty() {
                println!("No enrolled courses. Start with: passport progress enroll <COURSE>");
            }
            for (course_id, progress) in &all {
                match ctx.catalog.get(course_id) {
                    Some(course) => print_summary(course, progress),
                    None => println!("{}: {} (not in catalog)", course_id, progress.state()),
                }
            }
        }
    }
    Ok(())
}

fn print_summary(course: &Course, progress: &CourseProgress) {
    let total = course.total_lessons();
    println!(
        "{}: {} - {}/{} lessons, {}%",
        course.id,
        progress.state(),
        progress.completed_lesson_count(),
        total,
        progress.completion_percentage(total)
    );
    for lesson in course.ordered_lessons() {
        let mark = match progress.lessons_progress.get(&lesson.id) {
            Some(l) if l.completed => match l.quiz_score {
                Some(score) => format!("done ({}%)", score),
                None => "done".to_string(),
            },
            _ => "-".to_string(),
        };
        println!("    {:<10} {:<40} {}", lesson.id, lesson.title, mark);
    }
    if let Some(signature) = &progress.credential_tx_signature {
        println!("  Credential tx: {}", signature);
    }
}
