use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, ffi, params};

use super::Store;
use super::schema::SCHEMA;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::types::*;

/// A single connection to the journal database.
///
/// The connection is closed when the store is dropped.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self { conn })
    }

    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        Self::new(config.db_path()?)
    }

    /// Raw connection, for seeding and inspecting rows directly.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's datetime('now') format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .inspect_err(|e| tracing::warn!("Invalid datetime in database: '{}' - {}", s, e))
        .ok()
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .inspect_err(|e| tracing::warn!("Invalid date in database: '{}' - {}", s, e))
        .ok()
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Maps constraint failures on insert to domain errors.
fn insert_error(e: rusqlite::Error) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::AlreadyExists
        }
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            Error::UnknownReference
        }
        _ => Error::from(e),
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    let role = Role::parse(&role).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO users (email, full_name, role) VALUES (?1, ?2, ?3)",
                params![user.email, user.full_name, user.role.as_str()],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, email, full_name, role FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, full_name FROM users
             WHERE role = 'student'
             ORDER BY full_name, id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Student {
                id: row.get(0)?,
                email: row.get(1)?,
                full_name: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Class operations

    fn create_class(&self, teacher_id: i64, name: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO classes (name, teacher_id, created_at) VALUES (?1, ?2, ?3)",
                params![name, teacher_id, format_datetime(&Utc::now())],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_teacher_classes(&self, teacher_id: i64) -> Result<Vec<ClassWithCount>> {
        // One statement instead of a count query per class.
        let mut stmt = self.conn.prepare(
            "SELECT
               c.id,
               c.name,
               c.teacher_id,
               c.created_at,
               (SELECT COUNT(*) FROM class_students cs
                 WHERE cs.class_id = c.id AND cs.student_id IS NOT NULL) AS student_count
             FROM classes c
             WHERE c.teacher_id = ?1
             ORDER BY c.name, c.id",
        )?;

        let rows = stmt.query_map(params![teacher_id], |row| {
            Ok(ClassWithCount {
                class: Class {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    teacher_id: row.get(2)?,
                    created_at: row
                        .get::<_, Option<String>>(3)?
                        .and_then(|s| parse_datetime(&s)),
                },
                student_count: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Membership operations

    fn find_active_membership(&self, class_id: i64, student_id: i64) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM class_students WHERE class_id = ?1 AND student_id = ?2",
                params![class_id, student_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    fn add_membership(&self, class_id: i64, student_id: i64) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO class_students (class_id, student_id, created_at) VALUES (?1, ?2, ?3)",
                params![class_id, student_id, format_datetime(&Utc::now())],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn soft_remove_membership(&self, membership_id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE class_students SET student_id = NULL, removed_at = ?1
             WHERE id = ?2 AND student_id IS NOT NULL",
            params![format_datetime(&Utc::now()), membership_id],
        )?;
        Ok(rows > 0)
    }

    fn list_class_students(&self, class_id: i64) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.email, u.full_name, u.role
             FROM users u
             JOIN class_students cs ON u.id = cs.student_id
             WHERE cs.class_id = ?1
             ORDER BY u.full_name, u.id",
        )?;

        let rows = stmt.query_map(params![class_id], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Journal operations

    fn list_schedule(&self, user_id: i64) -> Result<Vec<ScheduleEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, day_of_week, time_slot, subject, teacher, classroom
             FROM schedule WHERE user_id = ?1
             ORDER BY day_of_week, time_slot, id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(ScheduleEntry {
                id: row.get(0)?,
                day_of_week: row.get(1)?,
                time_slot: row.get(2)?,
                subject: row.get(3)?,
                teacher: row.get(4)?,
                classroom: row.get(5)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_schedule_entry(&self, user_id: i64, entry: &NewScheduleEntry) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO schedule (user_id, day_of_week, time_slot, subject, teacher, classroom)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id,
                    entry.day_of_week,
                    entry.time_slot,
                    entry.subject,
                    entry.teacher,
                    entry.classroom,
                ],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_homework(&self, user_id: i64) -> Result<Vec<HomeworkItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, description, due_date, completed
             FROM homework WHERE user_id = ?1
             ORDER BY due_date, id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(HomeworkItem {
                id: row.get(0)?,
                subject: row.get(1)?,
                description: row.get(2)?,
                due_date: row.get::<_, Option<String>>(3)?.and_then(|s| parse_date(&s)),
                completed: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_homework(&self, user_id: i64, item: &NewHomeworkItem) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO homework (user_id, subject, description, due_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    user_id,
                    item.subject,
                    item.description,
                    format_date(&item.due_date),
                ],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    fn set_homework_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE homework SET completed = ?1 WHERE id = ?2 AND user_id = ?3",
            params![completed, id, user_id],
        )?;
        Ok(rows > 0)
    }

    fn list_grades(&self, user_id: i64) -> Result<Vec<GradeEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject, grade, grade_date, description
             FROM grades WHERE user_id = ?1
             ORDER BY grade_date DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(GradeEntry {
                id: row.get(0)?,
                subject: row.get(1)?,
                grade: row.get(2)?,
                grade_date: row.get::<_, Option<String>>(3)?.and_then(|s| parse_date(&s)),
                description: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_grade(&self, user_id: i64, grade: &NewGradeEntry) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO grades (user_id, subject, grade, grade_date, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id,
                    grade.subject,
                    grade.grade,
                    format_date(&grade.grade_date),
                    grade.description,
                ],
            )
            .map_err(insert_error)?;
        Ok(self.conn.last_insert_rowid())
    }
}
