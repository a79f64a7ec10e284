//! # E-journal
//!
//! Backend for a school electronic journal: teachers manage classes and
//! rosters, students and teachers keep schedules, homework and grades.
//!
//! The core is two synchronous resource handlers that take an HTTP-style
//! request (method, query map, JSON body) and return a status, headers and a
//! JSON body. Each invocation opens its own SQLite connection.
//!
//! ```rust,ignore
//! use ejournal::config::DatabaseConfig;
//! use ejournal::server::{ClassRosterHandler, HandlerRequest};
//! use axum::http::Method;
//!
//! let handler = ClassRosterHandler::new(DatabaseConfig::new("./data/ejournal.db"));
//! let resp = handler.handle(&HandlerRequest::new(Method::GET).with_query("teacher_id", 7));
//! assert_eq!(resp.status_code, 200);
//! ```
//!
//! The same handlers are served over HTTP by [`server::create_router`].
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `ejournal` binary.

pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
