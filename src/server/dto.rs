use serde::Serialize;
use serde_json::{Map, Value};

use crate::server::request::{FromBody, body_bool, body_i64, body_string};
use crate::server::response::ApiError;
use crate::server::validation::{
    optional_text, require, require_date, require_text, validate_day_of_week, validate_id,
};
use crate::types::{NewGradeEntry, NewHomeworkItem, NewScheduleEntry};

// Class roster requests

#[derive(Debug, Default)]
pub struct CreateClassRequest {
    pub name: Option<String>,
}

impl FromBody for CreateClassRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            name: body_string(body, "name")?,
        })
    }
}

#[derive(Debug, Default)]
pub struct MembershipRequest {
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
}

impl FromBody for MembershipRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            class_id: body_i64(body, "class_id")?,
            student_id: body_i64(body, "student_id")?,
        })
    }
}

impl MembershipRequest {
    /// Returns `(class_id, student_id)`.
    pub fn validate(self) -> Result<(i64, i64), ApiError> {
        match (self.class_id, self.student_id) {
            (Some(class_id), Some(student_id)) => Ok((
                validate_id("class_id", class_id)?,
                validate_id("student_id", student_id)?,
            )),
            _ => Err(ApiError::bad_request("class_id and student_id required")),
        }
    }
}

// Journal requests

#[derive(Debug, Default)]
pub struct CreateScheduleRequest {
    pub day_of_week: Option<i64>,
    pub time_slot: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub classroom: Option<String>,
}

impl FromBody for CreateScheduleRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            day_of_week: body_i64(body, "day_of_week")?,
            time_slot: body_string(body, "time_slot")?,
            subject: body_string(body, "subject")?,
            teacher: body_string(body, "teacher")?,
            classroom: body_string(body, "classroom")?,
        })
    }
}

impl CreateScheduleRequest {
    pub fn validate(self) -> Result<NewScheduleEntry, ApiError> {
        Ok(NewScheduleEntry {
            day_of_week: validate_day_of_week(require("day_of_week", self.day_of_week)?)?,
            time_slot: require_text("time_slot", self.time_slot)?,
            subject: require_text("subject", self.subject)?,
            teacher: optional_text(self.teacher),
            classroom: optional_text(self.classroom),
        })
    }
}

#[derive(Debug, Default)]
pub struct CreateHomeworkRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

impl FromBody for CreateHomeworkRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            subject: body_string(body, "subject")?,
            description: body_string(body, "description")?,
            due_date: body_string(body, "due_date")?,
        })
    }
}

impl CreateHomeworkRequest {
    pub fn validate(self) -> Result<NewHomeworkItem, ApiError> {
        Ok(NewHomeworkItem {
            subject: require_text("subject", self.subject)?,
            description: require_text("description", self.description)?,
            due_date: require_date("due_date", self.due_date)?,
        })
    }
}

#[derive(Debug, Default)]
pub struct CreateGradeRequest {
    pub subject: Option<String>,
    pub grade: Option<i64>,
    pub grade_date: Option<String>,
    pub description: Option<String>,
}

impl FromBody for CreateGradeRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            subject: body_string(body, "subject")?,
            grade: body_i64(body, "grade")?,
            grade_date: body_string(body, "grade_date")?,
            description: body_string(body, "description")?,
        })
    }
}

impl CreateGradeRequest {
    pub fn validate(self) -> Result<NewGradeEntry, ApiError> {
        Ok(NewGradeEntry {
            subject: require_text("subject", self.subject)?,
            grade: require("grade", self.grade)?,
            grade_date: require_date("grade_date", self.grade_date)?,
            description: optional_text(self.description),
        })
    }
}

#[derive(Debug, Default)]
pub struct UpdateEntryRequest {
    pub id: Option<i64>,
    pub completed: Option<bool>,
}

impl FromBody for UpdateEntryRequest {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            id: body_i64(body, "id")?,
            completed: body_bool(body, "completed")?,
        })
    }
}

// Responses

#[derive(Debug, Serialize)]
pub struct ClassesResponse<T: Serialize> {
    pub classes: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse<T: Serialize> {
    pub students: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedClassResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}
