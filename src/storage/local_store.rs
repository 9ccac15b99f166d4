use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

use crate::records::{
    Meeting, MeetingDraft, PersonalTodo, Project, ProjectRef, ProjectTask, TaskStatus, TodoDraft,
};
use crate::sync::data_source::{CalendarDataSource, SourceError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store lock poisoned")]
    LockPoisoned,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const MEETING_COLUMNS: &str = "m.id, m.title, m.description, m.start_time, m.end_time, m.project_id, \
     m.created_by, p.name AS project_name";

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.project_id, t.user_id, \
     t.scheduled_at, t.completed, t.created_at, t.updated_at, p.name AS project_name";

/// SQLite copy of the platform tables the calendar reads, with the same
/// visibility rules. Used offline and for sample data.
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self::new(Connection::open_in_memory()?);
        store.initialize()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_by TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS project_members (
                project_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                PRIMARY KEY (project_id, user_id)
            );
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                project_id TEXT,
                created_by TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'To-Do',
                project_id TEXT,
                user_id TEXT NOT NULL,
                scheduled_at TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let Ok(conn) = self.conn() else { return false };
        let result: rusqlite::Result<i32> = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    pub fn create_project(&self, name: &str, user_id: &str) -> Result<Project, StoreError> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO projects (id, name, created_by) VALUES (?1, ?2, ?3)",
            params![&project.id, &project.name, user_id],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)",
            params![&project.id, user_id],
        )?;
        tracing::info!("Created project {} for {}", project.id, user_id);
        Ok(project)
    }

    pub fn add_member(&self, project_id: &str, user_id: &str) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO project_members (project_id, user_id) VALUES (?1, ?2)",
            params![project_id, user_id],
        )?;
        Ok(())
    }

    pub fn user_projects(&self, user_id: &str) -> Result<Vec<Project>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name FROM projects p
             JOIN project_members pm ON pm.project_id = p.id
             WHERE pm.user_id = ?1
             ORDER BY p.rowid",
        )?;
        let projects = stmt
            .query_map([user_id], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn schedule_meeting(&self, draft: &MeetingDraft, user_id: &str) -> Result<Meeting, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.conn()?.execute(
            "INSERT INTO meetings (id, title, description, start_time, end_time, project_id, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id,
                &draft.title,
                &draft.description,
                draft.start_time.to_rfc3339(),
                draft.end_time.to_rfc3339(),
                &draft.project_id,
                user_id,
            ],
        )?;
        tracing::info!("Scheduled meeting {}: {}", id, draft.title);
        self.load_meeting(&id)?.ok_or(StoreError::NotFound(id))
    }

    fn load_meeting(&self, id: &str) -> Result<Option<Meeting>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {MEETING_COLUMNS} FROM meetings m
             LEFT JOIN projects p ON p.id = m.project_id
             WHERE m.id = ?1"
        );
        let meeting = conn.query_row(&sql, [id], read_meeting).optional()?;
        Ok(meeting.flatten())
    }

    pub fn project_meetings(&self, project_id: &str) -> Result<Vec<Meeting>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {MEETING_COLUMNS} FROM meetings m
             LEFT JOIN projects p ON p.id = m.project_id
             WHERE m.project_id = ?1
             ORDER BY m.rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let meetings = collect_rows(stmt.query_map([project_id], read_meeting)?)?;
        Ok(meetings)
    }

    /// Inserts a personal todo as submitted, scheduled now when the draft has
    /// no time. Callers validate the draft first.
    pub fn create_personal_todo(&self, draft: &TodoDraft, user_id: &str) -> Result<PersonalTodo, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let now = created_at.to_rfc3339();
        let scheduled_at = draft.scheduled_at.unwrap_or(created_at);
        self.conn()?.execute(
            "INSERT INTO tasks (id, title, description, status, project_id, user_id, scheduled_at,
                                completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, 0, ?7, ?7)",
            params![
                &id,
                &draft.title,
                &draft.description,
                TaskStatus::Todo.label(),
                user_id,
                scheduled_at.to_rfc3339(),
                &now,
            ],
        )?;
        self.load_todo(&id, user_id)?.ok_or(StoreError::NotFound(id))
    }

    fn load_todo(&self, id: &str, user_id: &str) -> Result<Option<PersonalTodo>, StoreError> {
        let conn = self.conn()?;
        let todo = conn
            .query_row(
                "SELECT id, title, description, scheduled_at, completed, user_id, created_at
                 FROM tasks WHERE id = ?1 AND user_id = ?2 AND project_id IS NULL",
                params![id, user_id],
                read_todo,
            )
            .optional()?;
        Ok(todo.flatten())
    }

    pub fn update_todo(&self, todo_id: &str, draft: &TodoDraft, user_id: &str) -> Result<(), StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET title = ?1, description = ?2, scheduled_at = COALESCE(?3, scheduled_at),
                              updated_at = ?4
             WHERE id = ?5 AND user_id = ?6 AND project_id IS NULL",
            params![
                &draft.title,
                &draft.description,
                draft.scheduled_at.map(|at| at.to_rfc3339()),
                Utc::now().to_rfc3339(),
                todo_id,
                user_id,
            ],
        )?;
        expect_changed(changed, todo_id)
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_todo(&self, todo_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET completed = NOT completed, updated_at = ?1
             WHERE id = ?2 AND user_id = ?3 AND project_id IS NULL",
            params![Utc::now().to_rfc3339(), todo_id, user_id],
        )?;
        expect_changed(changed, todo_id)?;

        let completed: bool = self.conn()?.query_row(
            "SELECT completed FROM tasks WHERE id = ?1",
            [todo_id],
            |row| row.get(0),
        )?;
        Ok(completed)
    }

    pub fn delete_todo(&self, todo_id: &str, user_id: &str) -> Result<(), StoreError> {
        let changed = self.conn()?.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2 AND project_id IS NULL",
            params![todo_id, user_id],
        )?;
        expect_changed(changed, todo_id)
    }

    pub fn create_project_task(
        &self,
        project_id: &str,
        title: &str,
        user_id: &str,
    ) -> Result<ProjectTask, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn()?.execute(
            "INSERT INTO tasks (id, title, status, project_id, user_id, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
            params![&id, title, TaskStatus::Todo.label(), project_id, user_id, &now],
        )?;
        self.load_task(&id)?.ok_or(StoreError::NotFound(id))
    }

    /// Sets a task's status and returns the stored row, ready to be pushed to
    /// realtime subscribers.
    pub fn update_task_status(&self, task_id: &str, status: &TaskStatus) -> Result<ProjectTask, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3 AND project_id IS NOT NULL",
            params![status.label(), Utc::now().to_rfc3339(), task_id],
        )?;
        expect_changed(changed, task_id)?;
        self.load_task(task_id)?.ok_or_else(|| StoreError::NotFound(task_id.to_string()))
    }

    fn load_task(&self, id: &str) -> Result<Option<ProjectTask>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t
             LEFT JOIN projects p ON p.id = t.project_id
             WHERE t.id = ?1 AND t.project_id IS NOT NULL"
        );
        let task = conn.query_row(&sql, [id], read_task).optional()?;
        Ok(task.flatten())
    }

    pub fn project_tasks(&self, project_id: &str) -> Result<Vec<ProjectTask>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t
             LEFT JOIN projects p ON p.id = t.project_id
             WHERE t.project_id = ?1
             ORDER BY t.rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let tasks = collect_rows(stmt.query_map([project_id], read_task)?)?;
        Ok(tasks)
    }

    pub fn visible_meetings(&self, user_id: &str) -> Result<Vec<Meeting>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {MEETING_COLUMNS} FROM meetings m
             LEFT JOIN projects p ON p.id = m.project_id
             WHERE m.created_by = ?1
                OR m.project_id IN (SELECT project_id FROM project_members WHERE user_id = ?1)
             ORDER BY m.rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let meetings = collect_rows(stmt.query_map([user_id], read_meeting)?)?;
        Ok(meetings)
    }

    pub fn personal_todos(&self, user_id: &str) -> Result<Vec<PersonalTodo>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, description, scheduled_at, completed, user_id, created_at
             FROM tasks
             WHERE user_id = ?1 AND project_id IS NULL
             ORDER BY rowid",
        )?;
        let todos = collect_rows(stmt.query_map([user_id], read_todo)?)?;
        Ok(todos)
    }

    pub fn member_project_tasks(&self, user_id: &str) -> Result<Vec<ProjectTask>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t
             LEFT JOIN projects p ON p.id = t.project_id
             WHERE t.project_id IN (SELECT project_id FROM project_members WHERE user_id = ?1)
             ORDER BY t.rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let tasks = collect_rows(stmt.query_map([user_id], read_task)?)?;
        Ok(tasks)
    }
}

#[async_trait]
impl CalendarDataSource for LocalStore {
    async fn fetch_meetings(&self, user_id: &str) -> Result<Vec<Meeting>, SourceError> {
        Ok(self.visible_meetings(user_id)?)
    }

    async fn fetch_personal_todos(&self, user_id: &str) -> Result<Vec<PersonalTodo>, SourceError> {
        Ok(self.personal_todos(user_id)?)
    }

    async fn fetch_project_tasks(&self, user_id: &str) -> Result<Vec<ProjectTask>, SourceError> {
        Ok(self.member_project_tasks(user_id)?)
    }
}

fn expect_changed(changed: usize, id: &str) -> Result<(), StoreError> {
    if changed == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

// Rows whose timestamps do not parse come back as `None` and are skipped.
fn collect_rows<T, I>(rows: I) -> Result<Vec<T>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<Option<T>>>,
{
    let records = rows
        .filter_map(|row| row.transpose())
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(records)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn read_meeting(row: &Row<'_>) -> rusqlite::Result<Option<Meeting>> {
    let id: String = row.get("id")?;
    let start_time: String = row.get("start_time")?;
    let end_time: String = row.get("end_time")?;
    let (Some(start_time), Some(end_time)) = (parse_timestamp(&start_time), parse_timestamp(&end_time)) else {
        tracing::warn!("Skipping meeting {} with unparsable times", id);
        return Ok(None);
    };
    let project_name: Option<String> = row.get("project_name")?;

    Ok(Some(Meeting {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        start_time,
        end_time,
        project_id: row.get("project_id")?,
        created_by: row.get("created_by")?,
        project: project_name.map(|name| ProjectRef { name }),
    }))
}

fn read_todo(row: &Row<'_>) -> rusqlite::Result<Option<PersonalTodo>> {
    let id: String = row.get("id")?;
    let scheduled_at: Option<String> = row.get("scheduled_at")?;
    let Some(scheduled_at) = scheduled_at.as_deref().and_then(parse_timestamp) else {
        tracing::warn!("Skipping todo {} without a usable schedule", id);
        return Ok(None);
    };
    let created_at: Option<String> = row.get("created_at")?;

    Ok(Some(PersonalTodo {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        scheduled_at,
        completed: row.get("completed")?,
        user_id: row.get("user_id")?,
        created_at: created_at.as_deref().and_then(parse_timestamp),
    }))
}

fn read_task(row: &Row<'_>) -> rusqlite::Result<Option<ProjectTask>> {
    let id: String = row.get("id")?;
    let created_at: String = row.get("created_at")?;
    let Some(created_at) = parse_timestamp(&created_at) else {
        tracing::warn!("Skipping task {} with unparsable creation time", id);
        return Ok(None);
    };
    let scheduled_at: Option<String> = row.get("scheduled_at")?;
    let updated_at: Option<String> = row.get("updated_at")?;
    let status: String = row.get("status")?;
    let project_name: Option<String> = row.get("project_name")?;

    Ok(Some(ProjectTask {
        id,
        title: row.get("title")?,
        status: TaskStatus::from(status),
        project_id: row.get("project_id")?,
        user_id: row.get("user_id")?,
        scheduled_at: scheduled_at.as_deref().and_then(parse_timestamp),
        completed: row.get("completed")?,
        created_at,
        updated_at: updated_at.as_deref().and_then(parse_timestamp),
        project: project_name.map(|name| ProjectRef { name }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use crate::calendar::aggregate_data;
    use crate::sync::{CalendarLoader, Session};

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn create_test_store() -> LocalStore {
        LocalStore::in_memory().unwrap()
    }

    fn titles<T>(records: &[T], title: impl Fn(&T) -> &str) -> Vec<&str> {
        records.iter().map(title).collect()
    }

    #[test]
    fn creates_database_schema() {
        let store = create_test_store();

        assert!(store.table_exists("projects"));
        assert!(store.table_exists("project_members"));
        assert!(store.table_exists("meetings"));
        assert!(store.table_exists("tasks"));
    }

    #[test]
    fn opens_store_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("crewcal.db");

        let store = LocalStore::open(&db_path).unwrap();
        store.create_project("Core", "u1").unwrap();

        assert!(db_path.exists());
        let reopened = LocalStore::open(&db_path).unwrap();
        assert_eq!(reopened.user_projects("u1").unwrap().len(), 1);
    }

    #[test]
    fn open_reports_unusable_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();

        let result = LocalStore::open(&blocker.join("crewcal.db"));

        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn project_creator_becomes_member() {
        let store = create_test_store();

        let project = store.create_project("Core", "u1").unwrap();

        assert_eq!(store.user_projects("u1").unwrap(), vec![project]);
        assert!(store.user_projects("u2").unwrap().is_empty());
    }

    #[test]
    fn meetings_visible_to_creator_and_project_members() {
        let store = create_test_store();
        let core = store.create_project("Core", "u2").unwrap();
        store.add_member(&core.id, "u1").unwrap();
        let other = store.create_project("Other", "u3").unwrap();
        let start = nine_am();
        let end = start + Duration::minutes(30);

        store.schedule_meeting(&MeetingDraft::new("Own", start, end), "u1").unwrap();
        store.schedule_meeting(&MeetingDraft::new("Shared", start, end).in_project(&core.id), "u2").unwrap();
        store.schedule_meeting(&MeetingDraft::new("Hidden", start, end).in_project(&other.id), "u3").unwrap();
        store.schedule_meeting(&MeetingDraft::new("Private", start, end), "u2").unwrap();

        let meetings = store.visible_meetings("u1").unwrap();

        assert_eq!(titles(&meetings, |m| m.title.as_str()), vec!["Own", "Shared"]);
        assert_eq!(meetings[1].project_name(), Some("Core"));
        assert_eq!(store.project_meetings(&core.id).unwrap().len(), 1);
    }

    #[test]
    fn personal_todos_are_owner_scoped() {
        let store = create_test_store();
        let core = store.create_project("Core", "u1").unwrap();
        store.create_personal_todo(&TodoDraft::new("Mine", nine_am()), "u1").unwrap();
        store.create_personal_todo(&TodoDraft::new("Theirs", nine_am()), "u2").unwrap();
        store.create_project_task(&core.id, "Project work", "u1").unwrap();

        let todos = store.personal_todos("u1").unwrap();

        assert_eq!(titles(&todos, |t| t.title.as_str()), vec!["Mine"]);
        assert!(!todos[0].completed);
        assert!(todos[0].created_at.is_some());
    }

    #[test]
    fn project_tasks_follow_membership() {
        let store = create_test_store();
        let core = store.create_project("Core", "u2").unwrap();
        let other = store.create_project("Other", "u3").unwrap();
        store.add_member(&core.id, "u1").unwrap();
        store.create_project_task(&core.id, "Visible", "u2").unwrap();
        store.create_project_task(&other.id, "Invisible", "u3").unwrap();

        let tasks = store.member_project_tasks("u1").unwrap();

        assert_eq!(titles(&tasks, |t| t.title.as_str()), vec!["Visible"]);
        assert_eq!(tasks[0].status, TaskStatus::Todo);
        assert_eq!(tasks[0].project_name(), Some("Core"));
    }

    #[test]
    fn toggle_and_delete_are_restricted_to_owner() {
        let store = create_test_store();
        let todo = store.create_personal_todo(&TodoDraft::new("Buy milk", nine_am()), "u1").unwrap();

        assert!(matches!(store.toggle_todo(&todo.id, "u2"), Err(StoreError::NotFound(_))));
        assert!(store.toggle_todo(&todo.id, "u1").unwrap());
        assert!(!store.toggle_todo(&todo.id, "u1").unwrap());

        assert!(matches!(store.delete_todo(&todo.id, "u2"), Err(StoreError::NotFound(_))));
        store.delete_todo(&todo.id, "u1").unwrap();
        assert!(store.personal_todos("u1").unwrap().is_empty());
    }

    #[test]
    fn unscheduled_todo_is_scheduled_at_creation() {
        let store = create_test_store();
        let before = Utc::now();

        let todo = store.create_personal_todo(&TodoDraft::unscheduled("Call plumber"), "u1").unwrap();

        assert!(todo.scheduled_at >= before - Duration::seconds(1));
        assert!(todo.scheduled_at <= Utc::now() + Duration::seconds(1));
        assert_eq!(Some(todo.scheduled_at), todo.created_at);
    }

    #[test]
    fn unscheduled_edit_keeps_stored_schedule() {
        let store = create_test_store();
        let todo = store.create_personal_todo(&TodoDraft::new("Original", nine_am()), "u1").unwrap();

        store.update_todo(&todo.id, &TodoDraft::unscheduled("Renamed"), "u1").unwrap();

        let loaded = store.personal_todos("u1").unwrap();
        assert_eq!(loaded[0].title, "Renamed");
        assert_eq!(loaded[0].scheduled_at, nine_am());
    }

    #[test]
    fn updates_existing_todo() {
        let store = create_test_store();
        let todo = store.create_personal_todo(&TodoDraft::new("Original", nine_am()), "u1").unwrap();
        let later = nine_am() + Duration::days(1);

        store
            .update_todo(&todo.id, &TodoDraft::new("Updated", later).with_description("notes"), "u1")
            .unwrap();

        let loaded = store.personal_todos("u1").unwrap();
        assert_eq!(loaded[0].title, "Updated");
        assert_eq!(loaded[0].scheduled_at, later);
        assert_eq!(loaded[0].description.as_deref(), Some("notes"));
    }

    #[test]
    fn task_status_update_returns_stored_row() {
        let store = create_test_store();
        let core = store.create_project("Core", "u1").unwrap();
        let task = store.create_project_task(&core.id, "Write docs", "u1").unwrap();

        let updated = store.update_task_status(&task.id, &TaskStatus::Done).unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.status, TaskStatus::Done);
        assert!(!updated.is_completed());
        assert_eq!(store.project_tasks(&core.id).unwrap(), vec![updated]);
        assert!(matches!(
            store.update_task_status("missing", &TaskStatus::Done),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn rows_with_unparsable_times_are_skipped() {
        let store = create_test_store();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO meetings (id, title, start_time, end_time, created_by)
                 VALUES ('bad', 'Broken', 'soon', 'later', 'u1')",
                [],
            )
            .unwrap();
        store
            .schedule_meeting(&MeetingDraft::new("Fine", nine_am(), nine_am() + Duration::hours(1)), "u1")
            .unwrap();

        let meetings = store.visible_meetings("u1").unwrap();

        assert_eq!(titles(&meetings, |m| m.title.as_str()), vec!["Fine"]);
    }

    #[tokio::test]
    async fn store_feeds_calendar_loader() {
        let store = create_test_store();
        let core = store.create_project("Core", "u1").unwrap();
        store
            .schedule_meeting(
                &MeetingDraft::new("Standup", nine_am(), nine_am() + Duration::minutes(30)).in_project(&core.id),
                "u1",
            )
            .unwrap();
        store.create_personal_todo(&TodoDraft::new("Buy milk", nine_am()), "u1").unwrap();
        let loader = CalendarLoader::new(store);

        let data = loader.load(Some(&Session::new("u1"))).await;
        let events = aggregate_data(&data);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "📅 Standup (Core)");
        assert_eq!(events[1].title, "✅ Buy milk");
    }
}
