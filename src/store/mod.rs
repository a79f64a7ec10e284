mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// One value is opened per request and dropped when the request finishes.
pub trait Store {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn list_students(&self) -> Result<Vec<Student>>;

    // Class operations
    fn create_class(&self, teacher_id: i64, name: &str) -> Result<i64>;
    fn list_teacher_classes(&self, teacher_id: i64) -> Result<Vec<ClassWithCount>>;

    // Membership operations (soft removal keeps the row)
    fn find_active_membership(&self, class_id: i64, student_id: i64) -> Result<Option<i64>>;
    fn add_membership(&self, class_id: i64, student_id: i64) -> Result<i64>;
    fn soft_remove_membership(&self, membership_id: i64) -> Result<bool>;
    fn list_class_students(&self, class_id: i64) -> Result<Vec<User>>;

    // Journal operations, always scoped to one user
    fn list_schedule(&self, user_id: i64) -> Result<Vec<ScheduleEntry>>;
    fn create_schedule_entry(&self, user_id: i64, entry: &NewScheduleEntry) -> Result<i64>;
    fn list_homework(&self, user_id: i64) -> Result<Vec<HomeworkItem>>;
    fn create_homework(&self, user_id: i64, item: &NewHomeworkItem) -> Result<i64>;
    fn set_homework_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<bool>;
    fn list_grades(&self, user_id: i64) -> Result<Vec<GradeEntry>>;
    fn create_grade(&self, user_id: i64, grade: &NewGradeEntry) -> Result<i64>;
}
