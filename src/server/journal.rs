//! Per-user journal: schedule, homework and grades.

use std::fmt;

use axum::http::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::server::connect;
use crate::server::dto::{
    CreateGradeRequest, CreateHomeworkRequest, CreateScheduleRequest, CreatedResponse,
    DataResponse, SuccessResponse, UpdateEntryRequest,
};
use crate::server::request::{HandlerRequest, parse_body};
use crate::server::response::{ApiError, HandlerResponse, StoreResultExt};
use crate::server::validation::{require, validate_id};
use crate::store::Store;
use crate::types::{NewGradeEntry, NewHomeworkItem, NewScheduleEntry};

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, OPTIONS";

/// The `type` discriminator of a journal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Schedule,
    Homework,
    Grades,
}

impl EntryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "schedule" => Some(Self::Schedule),
            "homework" => Some(Self::Homework),
            "grades" => Some(Self::Grades),
            _ => None,
        }
    }

    fn from_request(req: &HandlerRequest) -> Result<Self, ApiError> {
        req.query_param("type")
            .and_then(Self::parse)
            .ok_or_else(|| ApiError::bad_request("Invalid type"))
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Schedule => "schedule",
            Self::Homework => "homework",
            Self::Grades => "grades",
        })
    }
}

#[derive(Debug, Clone)]
pub enum JournalOperation {
    Read {
        user_id: i64,
        kind: EntryKind,
    },
    CreateSchedule {
        user_id: i64,
        entry: NewScheduleEntry,
    },
    CreateHomework {
        user_id: i64,
        item: NewHomeworkItem,
    },
    CreateGrade {
        user_id: i64,
        grade: NewGradeEntry,
    },
    /// `completed` is `None` unless the request targets homework and carries
    /// the flag; the update is then a no-op that still reports success.
    Update {
        user_id: i64,
        id: i64,
        completed: Option<bool>,
    },
}

impl JournalOperation {
    pub fn from_request(req: &HandlerRequest) -> Result<Self, ApiError> {
        if !matches!(req.method, Method::GET | Method::POST | Method::PUT) {
            return Err(ApiError::method_not_allowed());
        }

        let user_id = req.require_query_id("user_id")?;

        match req.method {
            Method::GET => Ok(Self::Read {
                user_id,
                kind: EntryKind::from_request(req)?,
            }),
            Method::POST => {
                let kind = EntryKind::from_request(req)?;
                let body = req.json_object()?;
                match kind {
                    EntryKind::Schedule => Ok(Self::CreateSchedule {
                        user_id,
                        entry: parse_body::<CreateScheduleRequest>(body)?.validate()?,
                    }),
                    EntryKind::Homework => Ok(Self::CreateHomework {
                        user_id,
                        item: parse_body::<CreateHomeworkRequest>(body)?.validate()?,
                    }),
                    EntryKind::Grades => Ok(Self::CreateGrade {
                        user_id,
                        grade: parse_body::<CreateGradeRequest>(body)?.validate()?,
                    }),
                }
            }
            _ => {
                let update: UpdateEntryRequest = parse_body(req.json_object()?)?;
                let id = validate_id("id", require("id", update.id)?)?;
                let is_homework = req.query_param("type").and_then(EntryKind::parse)
                    == Some(EntryKind::Homework);
                Ok(Self::Update {
                    user_id,
                    id,
                    completed: update.completed.filter(|_| is_homework),
                })
            }
        }
    }

    pub fn execute(self, store: &dyn Store) -> Result<HandlerResponse, ApiError> {
        match self {
            Self::Read { user_id, kind } => {
                debug!(user_id, %kind, "reading journal");
                match kind {
                    EntryKind::Schedule => {
                        let data = store
                            .list_schedule(user_id)
                            .api_err("Failed to list schedule")?;
                        Ok(HandlerResponse::ok(&DataResponse { data }))
                    }
                    EntryKind::Homework => {
                        let data = store.list_homework(user_id).api_err("Failed to list homework")?;
                        Ok(HandlerResponse::ok(&DataResponse { data }))
                    }
                    EntryKind::Grades => {
                        let data = store.list_grades(user_id).api_err("Failed to list grades")?;
                        Ok(HandlerResponse::ok(&DataResponse { data }))
                    }
                }
            }
            Self::CreateSchedule { user_id, entry } => {
                ensure_user(store, user_id)?;
                let id = store
                    .create_schedule_entry(user_id, &entry)
                    .api_err("Failed to create schedule entry")?;
                info!(user_id, id, "created schedule entry");
                Ok(HandlerResponse::created(&CreatedResponse { id }))
            }
            Self::CreateHomework { user_id, item } => {
                ensure_user(store, user_id)?;
                let id = store
                    .create_homework(user_id, &item)
                    .api_err("Failed to create homework")?;
                info!(user_id, id, "created homework");
                Ok(HandlerResponse::created(&CreatedResponse { id }))
            }
            Self::CreateGrade { user_id, grade } => {
                ensure_user(store, user_id)?;
                let id = store
                    .create_grade(user_id, &grade)
                    .api_err("Failed to create grade")?;
                info!(user_id, id, "created grade");
                Ok(HandlerResponse::created(&CreatedResponse { id }))
            }
            Self::Update {
                user_id,
                id,
                completed,
            } => {
                match completed {
                    Some(completed) => {
                        let updated = store
                            .set_homework_completed(user_id, id, completed)
                            .api_err("Failed to update homework")?;
                        info!(user_id, id, completed, updated, "updated homework completion");
                    }
                    None => debug!(user_id, id, "nothing to update"),
                }
                Ok(HandlerResponse::ok(&SuccessResponse::OK))
            }
        }
    }
}

fn ensure_user(store: &dyn Store, user_id: i64) -> Result<(), ApiError> {
    match store.get_user(user_id).api_err("Failed to look up user")? {
        Some(_) => Ok(()),
        None => Err(ApiError::bad_request("User not found")),
    }
}

/// Resource handler for schedule entries, homework and grades of one user.
#[derive(Debug, Clone)]
pub struct JournalHandler {
    database: DatabaseConfig,
}

impl JournalHandler {
    pub fn new(database: DatabaseConfig) -> Self {
        Self { database }
    }

    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("journal", %request_id, method = %req.method);
        let _enter = span.enter();

        if req.method == Method::OPTIONS {
            return HandlerResponse::preflight(ALLOWED_METHODS);
        }

        match self.dispatch(req) {
            Ok(resp) => resp,
            Err(err) => {
                warn!(status = err.status.as_u16(), "{}", err.message);
                err.into()
            }
        }
    }

    fn dispatch(&self, req: &HandlerRequest) -> Result<HandlerResponse, ApiError> {
        let operation = JournalOperation::from_request(req)?;
        let store = connect(&self.database)?;
        operation.execute(&store)
    }
}
