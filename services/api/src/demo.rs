use crate::infra::{InMemoryPlacementStore, InMemoryStudentDirectory, LoggingBroadcast};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use std::collections::BTreeMap;
use std::sync::Arc;

use placement_cell::error::AppError;
use placement_cell::workflows::placement::{
    AnswerValue, CatalogService, FieldKind, FieldSpec, InterviewRequest, JobDraft,
    PlacementLifecycleService, StudentRecord, SubmissionRequest, UserId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Days from today the demo interview is scheduled
    #[arg(long, default_value_t = 3)]
    pub(crate) interview_in_days: i64,
}

type DemoService =
    PlacementLifecycleService<InMemoryPlacementStore, InMemoryStudentDirectory, LoggingBroadcast>;

/// Walk the whole lifecycle against the in-memory adapters: seed a batch of
/// students and a posting, apply both ways, schedule an interview, then
/// fast-forward past the interview date to show the completion sweep.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryPlacementStore::default());
    let directory = Arc::new(InMemoryStudentDirectory::default());
    let broadcast = Arc::new(LoggingBroadcast::default());
    let lifecycle = PlacementLifecycleService::new(store.clone(), directory.clone(), broadcast.clone());
    let catalog = CatalogService::new(store, directory.clone());

    let today = Local::now().date_naive();
    let interview_date = today + Duration::days(args.interview_in_days.max(1));

    println!("Placement lifecycle demo");
    println!("Today: {today}, interview scheduled for {interview_date}\n");

    for (n, name) in [(1, "Asha"), (2, "Ravi"), (3, "Meena")] {
        directory.seed(demo_student(n, name));
    }

    let job = catalog.post_job(JobDraft {
        title: "Graduate Software Engineer".to_string(),
        company: "Cobalt Systems".to_string(),
        location: "Jaipur".to_string(),
        package: "6.5 LPA".to_string(),
        description: "Backend development on the billing platform.".to_string(),
        description_file: None,
        requirements: vec!["Rust or Go".to_string(), "No active backlogs".to_string()],
        department: "Computer Science".to_string(),
        duration: "Full time".to_string(),
        deadline: today + Duration::days(30),
    })?;
    println!(
        "Posted \"{}\" at {} (id {})",
        job.title,
        job.company,
        job.id.as_str()
    );

    lifecycle.apply_direct(&student_id(1), job.id.as_str(), &job.title, &job.company)?;
    println!("Asha applied directly");

    lifecycle.define_form(
        job.id.as_str(),
        vec![
            FieldSpec {
                label: "Resume".to_string(),
                kind: FieldKind::File,
                options: Vec::new(),
                required: true,
            },
            FieldSpec {
                label: "CGPA".to_string(),
                kind: FieldKind::Number,
                options: Vec::new(),
                required: true,
            },
        ],
    )?;
    lifecycle.submit_application(SubmissionRequest {
        user_id: student_id(2),
        job_id: job.id.0.clone(),
        job_title: job.title.clone(),
        company_name: job.company.clone(),
        answers: BTreeMap::from([
            (
                "Resume".to_string(),
                AnswerValue::FileReference("/uploads/resume-ravi.pdf".to_string()),
            ),
            ("CGPA".to_string(), AnswerValue::Number(8.4)),
        ]),
    })?;
    println!("Ravi submitted through the custom form\n");

    let outcome = lifecycle.schedule_interview(InterviewRequest {
        job_id: job.id.0.clone(),
        interviewer_email: "panel@cobalt.example.com".to_string(),
        date: interview_date,
        time: "10:30".to_string(),
        location: "Placement block, Room 4".to_string(),
        link: Some("https://meet.example.com/cobalt-grad".to_string()),
        attachment: None,
    })?;
    println!(
        "Interview scheduled: {} tracking records advanced, {} notifications delivered",
        outcome.advanced, outcome.notified
    );
    for (event, payload) in broadcast.recent() {
        println!("Push event: {event} {payload}");
    }

    println!("\nStatus as of {today}");
    render_statuses(&lifecycle, today)?;

    let later = interview_date + Duration::days(1);
    println!("\nStatus as of {later} (after the interview date)");
    render_statuses(&lifecycle, later)?;

    println!("\nAsha's notification feed");
    for notification in lifecycle.notifications_for(&student_id(1))? {
        println!("- [{:?}] {}", notification.kind, notification.message);
    }

    Ok(())
}

fn render_statuses(lifecycle: &DemoService, on: NaiveDate) -> Result<(), AppError> {
    for (n, name) in [(1, "Asha"), (2, "Ravi")] {
        for tracking in lifecycle.placement_status(&student_id(n), on)? {
            println!(
                "- {name}: {} at {} -> {}",
                tracking.job_title,
                tracking.company_name,
                tracking.status.label()
            );
        }
    }
    Ok(())
}

fn student_id(n: u64) -> String {
    format!("{:024x}", 0x1000 + n)
}

fn demo_student(n: u64, name: &str) -> StudentRecord {
    StudentRecord {
        id: UserId(student_id(n)),
        name: name.to_string(),
        email: format!("{}@college.example.edu", name.to_ascii_lowercase()),
        registration_number: format!("PU2021{n:04}"),
        department: "Computer Science".to_string(),
        fee_paid: true,
        cgpa: "8.1".to_string(),
        academic_year: "Final".to_string(),
        backlogs: 0,
        attendance: "92%".to_string(),
    }
}
