pub const SCHEMA: &str = r#"
-- Teachers and students share one table; role decides what they may appear as
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('teacher', 'student')),
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    teacher_id INTEGER NOT NULL REFERENCES users(id),
    created_at TEXT DEFAULT (datetime('now'))
);

-- Removal nulls student_id and stamps removed_at; rows are never deleted
CREATE TABLE IF NOT EXISTS class_students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    class_id INTEGER NOT NULL REFERENCES classes(id),
    student_id INTEGER REFERENCES users(id),
    created_at TEXT DEFAULT (datetime('now')),
    removed_at TEXT
);

CREATE TABLE IF NOT EXISTS schedule (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    day_of_week INTEGER NOT NULL,
    time_slot TEXT NOT NULL,
    subject TEXT NOT NULL,
    teacher TEXT,
    classroom TEXT
);

CREATE TABLE IF NOT EXISTS homework (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    description TEXT NOT NULL,
    due_date TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS grades (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    subject TEXT NOT NULL,
    grade INTEGER NOT NULL,
    grade_date TEXT NOT NULL,
    description TEXT
);

-- Only one active membership per (class, student)
CREATE UNIQUE INDEX IF NOT EXISTS idx_class_students_active
    ON class_students(class_id, student_id) WHERE student_id IS NOT NULL;

CREATE INDEX IF NOT EXISTS idx_classes_teacher ON classes(teacher_id);
CREATE INDEX IF NOT EXISTS idx_class_students_class ON class_students(class_id);
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);
CREATE INDEX IF NOT EXISTS idx_schedule_user ON schedule(user_id, day_of_week, time_slot);
CREATE INDEX IF NOT EXISTS idx_homework_user ON homework(user_id, due_date);
CREATE INDEX IF NOT EXISTS idx_grades_user ON grades(user_id, grade_date);
"#;
