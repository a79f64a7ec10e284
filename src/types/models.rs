use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// Entry of the school-wide student directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassWithCount {
    #[serde(flatten)]
    pub class: Class,
    /// Active memberships only; soft-removed rows are not counted.
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub day_of_week: i64,
    pub time_slot: String,
    pub subject: String,
    pub teacher: Option<String>,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewScheduleEntry {
    pub day_of_week: i64,
    pub time_slot: String,
    pub subject: String,
    pub teacher: Option<String>,
    pub classroom: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeworkItem {
    pub id: i64,
    pub subject: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct NewHomeworkItem {
    pub subject: String,
    pub description: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    pub id: i64,
    pub subject: String,
    pub grade: i64,
    pub grade_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewGradeEntry {
    pub subject: String,
    pub grade: i64,
    pub grade_date: NaiveDate,
    pub description: Option<String>,
}
