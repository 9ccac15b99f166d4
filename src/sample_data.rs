use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use crewcal::{
    records::{MeetingDraft, TaskStatus, TodoDraft},
    storage::{LocalStore, StoreError},
};

pub const SAMPLE_USER: &str = "sample-user";
const TEAMMATE: &str = "sample-teammate";

/// Fills an empty store with a small team around `today`.
pub fn seed(store: &LocalStore, today: NaiveDate) -> Result<(), StoreError> {
    let Some(tomorrow) = today.succ_opt() else { return Ok(()) };
    let Some(yesterday) = today.pred_opt() else { return Ok(()) };

    let core = store.create_project("Core", SAMPLE_USER)?;
    let launch = store.create_project("Launch", TEAMMATE)?;
    store.add_member(&launch.id, SAMPLE_USER)?;
    store.add_member(&core.id, TEAMMATE)?;
    let hidden = store.create_project("Skunkworks", TEAMMATE)?;

    let meetings = vec![
        ("Morning Standup", today, (9, 0), (9, 30), Some(&core.id), SAMPLE_USER),
        ("Launch Review", today, (14, 0), (15, 0), Some(&launch.id), TEAMMATE),
        ("Sprint Planning", tomorrow, (15, 0), (16, 30), Some(&core.id), TEAMMATE),
        ("1-on-1 with Manager", yesterday, (11, 0), (11, 30), None, SAMPLE_USER),
        ("Secret Sync", today, (10, 0), (10, 30), Some(&hidden.id), TEAMMATE),
    ];

    for (title, date, start, end, project_id, creator) in meetings {
        let (Some(start), Some(end)) = (local(date, start), local(date, end)) else { continue };
        let mut draft = MeetingDraft::new(title, start, end);
        if let Some(project_id) = project_id {
            draft = draft.in_project(project_id);
        }
        store.schedule_meeting(&draft, creator)?;
    }

    let todos = vec![
        ("Buy milk", today, (8, 0), false),
        ("Book flights", today, (17, 0), false),
        ("File expenses", yesterday, (16, 0), true),
    ];

    for (title, date, at, done) in todos {
        let Some(scheduled_at) = local(date, at) else { continue };
        let todo = store.create_personal_todo(&TodoDraft::new(title, scheduled_at), SAMPLE_USER)?;
        if done {
            store.toggle_todo(&todo.id, SAMPLE_USER)?;
        }
    }

    store.create_project_task(&core.id, "Write release notes", SAMPLE_USER)?;
    let review = store.create_project_task(&launch.id, "Review landing page", TEAMMATE)?;
    store.update_task_status(&review.id, &TaskStatus::InProgress)?;
    let checklist = store.create_project_task(&core.id, "Update checklist", TEAMMATE)?;
    store.update_task_status(&checklist.id, &TaskStatus::Done)?;

    tracing::info!("Seeded sample calendar for {}", today);
    Ok(())
}

fn local(date: NaiveDate, (hour, minute): (u32, u32)) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
