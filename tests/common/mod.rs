#![allow(dead_code)]

use axum::http::Method;
use ejournal::config::DatabaseConfig;
use ejournal::server::{ClassRosterHandler, HandlerRequest, HandlerResponse, JournalHandler};
use ejournal::store::{SqliteStore, Store};
use ejournal::types::{NewUser, Role};
use serde_json::Value;
use tempfile::TempDir;

/// An isolated database plus both handlers pointed at it.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub database: DatabaseConfig,
    pub classes: ClassRosterHandler,
    pub journal: JournalHandler,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("ejournal.db");
        let database = DatabaseConfig::new(db_path.to_string_lossy().to_string());

        SqliteStore::connect(&database)
            .expect("open store")
            .initialize()
            .expect("initialize schema");

        Self {
            classes: ClassRosterHandler::new(database.clone()),
            journal: JournalHandler::new(database.clone()),
            temp_dir,
            database,
        }
    }

    pub fn store(&self) -> SqliteStore {
        SqliteStore::connect(&self.database).expect("open store")
    }

    pub fn add_user(&self, email: &str, full_name: &str, role: Role) -> i64 {
        self.store()
            .create_user(&NewUser {
                email: email.to_string(),
                full_name: full_name.to_string(),
                role,
            })
            .expect("create user")
    }

    /// Inserts a user with a fixed id.
    pub fn add_user_with_id(&self, id: i64, full_name: &str, role: Role) {
        self.store()
            .connection()
            .execute(
                "INSERT INTO users (id, email, full_name, role) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, format!("user{id}@school.test"), full_name, role.as_str()],
            )
            .expect("insert user");
    }

    pub fn classes(&self, req: HandlerRequest) -> HandlerResponse {
        self.classes.handle(&req)
    }

    pub fn journal(&self, req: HandlerRequest) -> HandlerResponse {
        self.journal.handle(&req)
    }
}

/// Handlers pointed at a database that cannot be opened.
pub fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig::new("/nonexistent-ejournal-dir/sub/ejournal.db")
}

pub fn get() -> HandlerRequest {
    HandlerRequest::new(Method::GET)
}

pub fn post() -> HandlerRequest {
    HandlerRequest::new(Method::POST)
}

pub fn put() -> HandlerRequest {
    HandlerRequest::new(Method::PUT)
}

pub fn delete() -> HandlerRequest {
    HandlerRequest::new(Method::DELETE)
}

pub fn options() -> HandlerRequest {
    HandlerRequest::new(Method::OPTIONS)
}

pub fn body(resp: &HandlerResponse) -> Value {
    serde_json::from_str(&resp.body).expect("json body")
}
