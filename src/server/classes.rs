//! Class roster: teachers' classes and their student memberships.

use axum::http::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::Error;
use crate::server::connect;
use crate::server::dto::{
    ClassesResponse, CreateClassRequest, CreatedClassResponse, CreatedResponse, MembershipRequest,
    StudentsResponse, SuccessResponse,
};
use crate::server::request::{HandlerRequest, body_action, parse_body};
use crate::server::response::{ApiError, HandlerResponse, StoreResultExt, store_error};
use crate::server::validation::validate_class_name;
use crate::store::Store;

pub const ALLOWED_METHODS: &str = "GET, POST, DELETE, OPTIONS";

/// One validated roster operation, built before any connection is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOperation {
    ListClasses { teacher_id: i64 },
    ListClassStudents { class_id: i64 },
    ListAllStudents,
    CreateClass { teacher_id: i64, name: String },
    AddStudent { class_id: i64, student_id: i64 },
    RemoveStudent { class_id: i64, student_id: i64 },
}

impl RosterOperation {
    pub fn from_request(req: &HandlerRequest) -> Result<Self, ApiError> {
        match req.method {
            Method::GET => Self::from_query(req),
            Method::POST => {
                let body = req.json_object()?;
                match body_action(req, &body).as_deref() {
                    Some("create_class") => {
                        let teacher_id = req.require_query_id("teacher_id")?;
                        let create: CreateClassRequest = parse_body(body)?;
                        let name = validate_class_name(create.name.as_deref())?;
                        Ok(Self::CreateClass { teacher_id, name })
                    }
                    Some("add_student") => {
                        let (class_id, student_id) =
                            parse_body::<MembershipRequest>(body)?.validate()?;
                        Ok(Self::AddStudent {
                            class_id,
                            student_id,
                        })
                    }
                    _ => Err(ApiError::bad_request("Invalid action")),
                }
            }
            Method::DELETE => {
                let body = req.json_object()?;
                match body_action(req, &body).as_deref() {
                    Some("remove_student") => {
                        let (class_id, student_id) =
                            parse_body::<MembershipRequest>(body)?.validate()?;
                        Ok(Self::RemoveStudent {
                            class_id,
                            student_id,
                        })
                    }
                    _ => Err(ApiError::bad_request("Invalid action")),
                }
            }
            _ => Err(ApiError::method_not_allowed()),
        }
    }

    fn from_query(req: &HandlerRequest) -> Result<Self, ApiError> {
        match req.query_param("action") {
            Some("students") => Ok(Self::ListClassStudents {
                class_id: req.require_query_id("class_id")?,
            }),
            Some("all_students") => Ok(Self::ListAllStudents),
            Some(_) => Err(ApiError::bad_request("Invalid action")),
            None => Ok(Self::ListClasses {
                teacher_id: req.require_query_id("teacher_id")?,
            }),
        }
    }

    pub fn execute(self, store: &dyn Store) -> Result<HandlerResponse, ApiError> {
        match self {
            Self::ListClasses { teacher_id } => {
                let classes = store
                    .list_teacher_classes(teacher_id)
                    .api_err("Failed to list classes")?;
                debug!(teacher_id, count = classes.len(), "listed classes");
                Ok(HandlerResponse::ok(&ClassesResponse { classes }))
            }
            Self::ListClassStudents { class_id } => {
                let students = store
                    .list_class_students(class_id)
                    .api_err("Failed to list class students")?;
                debug!(class_id, count = students.len(), "listed class students");
                Ok(HandlerResponse::ok(&StudentsResponse { students }))
            }
            Self::ListAllStudents => {
                let students = store.list_students().api_err("Failed to list students")?;
                Ok(HandlerResponse::ok(&StudentsResponse { students }))
            }
            Self::CreateClass { teacher_id, name } => {
                let id = store.create_class(teacher_id, &name).map_err(|e| match e {
                    Error::UnknownReference => ApiError::bad_request("Teacher not found"),
                    e => store_error(e, "Failed to create class"),
                })?;
                info!(class_id = id, teacher_id, "created class");
                Ok(HandlerResponse::created(&CreatedClassResponse { id, name }))
            }
            Self::AddStudent {
                class_id,
                student_id,
            } => {
                if store
                    .find_active_membership(class_id, student_id)
                    .api_err("Failed to check membership")?
                    .is_some()
                {
                    return Err(ApiError::conflict("Student already in class"));
                }

                let id = store
                    .add_membership(class_id, student_id)
                    .map_err(|e| match e {
                        Error::AlreadyExists => ApiError::conflict("Student already in class"),
                        Error::UnknownReference => {
                            ApiError::bad_request("Class or student not found")
                        }
                        e => store_error(e, "Failed to add student"),
                    })?;
                info!(membership_id = id, class_id, student_id, "added student to class");
                Ok(HandlerResponse::created(&CreatedResponse { id }))
            }
            Self::RemoveStudent {
                class_id,
                student_id,
            } => {
                // Removing an absent member still succeeds.
                match store
                    .find_active_membership(class_id, student_id)
                    .api_err("Failed to check membership")?
                {
                    Some(membership_id) => {
                        store
                            .soft_remove_membership(membership_id)
                            .api_err("Failed to remove student")?;
                        info!(membership_id, class_id, student_id, "removed student from class");
                    }
                    None => debug!(class_id, student_id, "no active membership to remove"),
                }
                Ok(HandlerResponse::ok(&SuccessResponse::OK))
            }
        }
    }
}

/// Resource handler for `Class` entities and their memberships.
#[derive(Debug, Clone)]
pub struct ClassRosterHandler {
    database: DatabaseConfig,
}

impl ClassRosterHandler {
    pub fn new(database: DatabaseConfig) -> Self {
        Self { database }
    }

    pub fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("classes", %request_id, method = %req.method);
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
        let operation = RosterOperation::from_request(req)?;
        let store = connect(&self.database)?;
        operation.execute(&store)
    }
}
