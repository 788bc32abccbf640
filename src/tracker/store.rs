//! Tracker store trait and `SQLite` implementation.

use crate::error::{Error, Result};
use crate::tracker::models::{
    NewProject, NewTask, Project, ProjectSummary, ProjectUpdate, Status, Task, TaskUpdate,
};
use crate::tracker::query::{
    like_pattern, Page, PageRequest, ProjectQuery, TaskFilter, TaskQuery,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, ToSql};
use std::path::{Path, PathBuf};

/// Trait for project and task storage operations.
///
/// Store methods do not validate user input; callers gate mutations.
#[allow(clippy::missing_errors_doc)]
pub trait TrackerStore {
    // Project CRUD
    /// Create a new project.
    fn create_project(&self, project: &NewProject) -> Result<Project>;

    /// Get a project by ID.
    fn get_project(&self, id: i64) -> Result<Option<Project>>;

    /// Check whether a project exists.
    fn project_exists(&self, id: i64) -> Result<bool>;

    /// Update a project's fields.
    fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<Option<Project>>;

    /// Delete a project and all of its tasks.
    fn delete_project(&self, id: i64) -> Result<bool>;

    /// List one page of projects, each with its task count.
    fn list_projects(&self, query: &ProjectQuery) -> Result<Page<ProjectSummary>>;

    // Task CRUD
    /// Create a new task. The owning project must exist.
    fn create_task(&self, task: &NewTask) -> Result<Task>;

    /// Get a task by ID.
    fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// Update a task's fields.
    fn update_task(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>>;

    /// Delete a task by ID.
    fn delete_task(&self, id: i64) -> Result<bool>;

    /// List one page of tasks matching the query.
    fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>>;

    /// Every task matching the filter, unpaginated.
    fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// All tasks of one project, in id order.
    fn tasks_for_project(&self, project_id: i64) -> Result<Vec<Task>> {
        self.find_tasks(&TaskFilter { project_id: Some(project_id), ..Default::default() })
    }
}

/// Format a timestamp the way it is stored: fixed-width RFC 3339, so text
/// comparison in SQL matches chronological order.
fn stored_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Read a stored timestamp column.
fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

const PROJECT_COLUMNS: &str = "id, name, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, status, project_id, created_at, updated_at";

/// AND-composed `WHERE` conditions with their bound values.
#[derive(Default)]
struct WhereClause {
    conditions: Vec<&'static str>,
    values: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    fn push(&mut self, condition: &'static str, value: impl ToSql + 'static) {
        self.conditions.push(condition);
        self.values.push(Box::new(value));
    }

    fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&dyn ToSql> {
        self.values.iter().map(AsRef::as_ref).collect()
    }

    fn for_tasks(filter: &TaskFilter) -> Self {
        let mut clause = Self::default();
        if let Some(ref search) = filter.search {
            clause.push(r"unicode_lower(title) LIKE ? ESCAPE '\'", search_pattern(search));
        }
        if let Some(status) = filter.status {
            clause.push("status = ?", status.as_str());
        }
        if let Some(project_id) = filter.project_id {
            clause.push("project_id = ?", project_id);
        }
        if let Some(before) = filter.created_before {
            clause.push("created_at < ?", stored_timestamp(before));
        }
        clause
    }

    fn for_projects(query: &ProjectQuery) -> Self {
        let mut clause = Self::default();
        if let Some(ref search) = query.search {
            clause.push(r"unicode_lower(p.name) LIKE ? ESCAPE '\'", search_pattern(search));
        }
        clause
    }
}

/// `LIKE` pattern for a search term, lowercased to match `unicode_lower`.
fn search_pattern(term: &str) -> String {
    like_pattern(&term.to_lowercase())
}

/// Register `unicode_lower(text)`. `SQLite`'s own `lower()` and `LIKE` only
/// fold ASCII letters.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
    )
}

/// Convert a page position to `LIMIT`/`OFFSET` values.
fn limit_offset(page: PageRequest) -> (i64, i64) {
    (i64::from(page.per_page), i64::try_from(page.offset()).unwrap_or(i64::MAX))
}

/// SQLite-based tracker store.
#[derive(Debug, Clone)]
pub struct SqliteTrackerStore {
    db_path: PathBuf,
}

impl SqliteTrackerStore {
    /// Create a new `SQLite` store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a store over an existing database without touching its schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not a readable database or lacks the
    /// tracker tables.
    pub fn open_existing(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        let tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('projects', 'tasks')",
            [],
            |row| row.get(0),
        )?;
        if tables < 2 {
            return Err(Error::Config(format!(
                "{} is not a project tracker database",
                db_path.display()
            )));
        }
        Ok(Self { db_path })
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        register_functions(&conn)?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'completed')),
                project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_status_created_at ON tasks(status, created_at);
            ",
        )?;

        Ok(())
    }

    /// Parse a project from a row.
    fn parse_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: timestamp_column(row, 2)?,
            updated_at: timestamp_column(row, 3)?,
        })
    }

    /// Parse a task from a row.
    fn parse_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get(2)?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            status: Status::from_str(&status_str).unwrap_or_default(),
            project_id: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
            updated_at: timestamp_column(row, 5)?,
        })
    }

    fn fetch_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
        let project = conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                Self::parse_project,
            )
            .optional()?;
        Ok(project)
    }

    fn fetch_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                Self::parse_task,
            )
            .optional()?;
        Ok(task)
    }
}

impl TrackerStore for SqliteTrackerStore {
    fn create_project(&self, project: &NewProject) -> Result<Project> {
        let conn = self.open()?;
        let now = stored_timestamp(Utc::now());

        conn.execute(
            "INSERT INTO projects (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![project.name, now],
        )?;
        let id = conn.last_insert_rowid();

        let created = conn.query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
            Self::parse_project,
        )?;
        tracing::debug!(project_id = id, name = %created.name, "project created");

        Ok(created)
    }

    fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.open()?;
        Self::fetch_project(&conn, id)
    }

    fn project_exists(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<Option<Project>> {
        if update.is_empty() {
            return self.get_project(id);
        }

        let conn = self.open()?;
        if Self::fetch_project(&conn, id)?.is_none() {
            return Ok(None);
        }

        if let Some(name) = update.name {
            conn.execute(
                "UPDATE projects SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, stored_timestamp(Utc::now()), id],
            )?;
        }
        tracing::debug!(project_id = id, "project updated");

        Self::fetch_project(&conn, id)
    }

    fn delete_project(&self, id: i64) -> Result<bool> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        // Tasks go first, in the same transaction as their project.
        let tasks_removed = tx.execute("DELETE FROM tasks WHERE project_id = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        tx.commit()?;

        if rows > 0 {
            tracing::debug!(project_id = id, tasks_removed, "project deleted");
        }
        Ok(rows > 0)
    }

    fn list_projects(&self, query: &ProjectQuery) -> Result<Page<ProjectSummary>> {
        let conn = self.open()?;
        let clause = WhereClause::for_projects(query);
        let where_sql = clause.sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM projects p {where_sql}"),
            clause.params().as_slice(),
            |row| row.get(0),
        )?;

        let (limit, offset) = limit_offset(query.page);
        let mut params = clause.params();
        params.push(&limit);
        params.push(&offset);

        let sql = format!(
            "SELECT p.id, p.name, p.created_at, p.updated_at,
                    (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id)
             FROM projects p {where_sql}
             ORDER BY p.id ASC
             LIMIT ? OFFSET ?"
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params.as_slice(), |row| {
                let tasks_count: i64 = row.get(4)?;
                Ok(ProjectSummary {
                    project: Self::parse_project(row)?,
                    tasks_count: u64::try_from(tasks_count).unwrap_or(0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page::new(items, query.page, u64::try_from(total).unwrap_or(0)))
    }

    fn create_task(&self, task: &NewTask) -> Result<Task> {
        let conn = self.open()?;
        let now = Utc::now();
        let created_at = stored_timestamp(task.created_at.unwrap_or(now));

        conn.execute(
            "INSERT INTO tasks (title, status, project_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![task.title, task.status.as_str(), task.project_id, created_at],
        )?;
        let id = conn.last_insert_rowid();

        let created = conn.query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
            Self::parse_task,
        )?;
        tracing::debug!(task_id = id, project_id = task.project_id, "task created");

        Ok(created)
    }

    fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.open()?;
        Self::fetch_task(&conn, id)
    }

    fn update_task(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>> {
        if update.is_empty() {
            return self.get_task(id);
        }

        let conn = self.open()?;
        if Self::fetch_task(&conn, id)?.is_none() {
            return Ok(None);
        }

        // Build dynamic UPDATE statement
        let mut updates = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(stored_timestamp(Utc::now()))];

        if let Some(title) = update.title {
            updates.push("title = ?");
            values.push(Box::new(title));
        }
        if let Some(status) = update.status {
            updates.push("status = ?");
            values.push(Box::new(status.as_str()));
        }
        if let Some(project_id) = update.project_id {
            updates.push("project_id = ?");
            values.push(Box::new(project_id));
        }

        values.push(Box::new(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn ToSql> = values.iter().map(AsRef::as_ref).collect();
        conn.execute(&sql, params.as_slice())?;
        tracing::debug!(task_id = id, "task updated");

        Self::fetch_task(&conn, id)
    }

    fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if rows > 0 {
            tracing::debug!(task_id = id, "task deleted");
        }
        Ok(rows > 0)
    }

    fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>> {
        let conn = self.open()?;
        let clause = WhereClause::for_tasks(&query.filter);
        let where_sql = clause.sql();

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks {where_sql}"),
            clause.params().as_slice(),
            |row| row.get(0),
        )?;

        let (limit, offset) = limit_offset(query.page);
        let mut params = clause.params();
        params.push(&limit);
        params.push(&offset);

        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_sql} ORDER BY id ASC LIMIT ? OFFSET ?"
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params.as_slice(), Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Page::new(items, query.page, u64::try_from(total).unwrap_or(0)))
    }

    fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.open()?;
        let clause = WhereClause::for_tasks(filter);

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks {} ORDER BY id ASC", clause.sql());
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(clause.params().as_slice(), Self::parse_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tasks)
    }
}
