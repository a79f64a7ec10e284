mod common;

use common::{TestEnv, body, delete, get, options, post, put, unreachable_database};
use ejournal::server::ClassRosterHandler;
use ejournal::types::Role;
use serde_json::{Value, json};

fn create_class(env: &TestEnv, teacher_id: i64, name: &str) -> i64 {
    let resp = env.classes(
        post()
            .with_query("teacher_id", teacher_id)
            .with_json(&json!({"action": "create_class", "name": name})),
    );
    assert_eq!(resp.status_code, 201, "{}", resp.body);
    body(&resp)["id"].as_i64().expect("class id")
}

fn add_student(env: &TestEnv, class_id: i64, student_id: i64) -> u16 {
    env.classes(post().with_json(&json!({
        "action": "add_student",
        "class_id": class_id,
        "student_id": student_id
    })))
    .status_code
}

fn remove_student(env: &TestEnv, class_id: i64, student_id: i64) -> Value {
    let resp = env.classes(delete().with_json(&json!({
        "action": "remove_student",
        "class_id": class_id,
        "student_id": student_id
    })));
    assert_eq!(resp.status_code, 200);
    body(&resp)
}

fn class_student_ids(env: &TestEnv, class_id: i64) -> Vec<i64> {
    let resp = env.classes(
        get()
            .with_query("action", "students")
            .with_query("class_id", class_id),
    );
    assert_eq!(resp.status_code, 200);
    body(&resp)["students"]
        .as_array()
        .expect("students array")
        .iter()
        .map(|s| s["id"].as_i64().expect("student id"))
        .collect()
}

fn student_count(env: &TestEnv, teacher_id: i64, class_id: i64) -> i64 {
    let resp = env.classes(get().with_query("teacher_id", teacher_id));
    assert_eq!(resp.status_code, 200);
    let classes = body(&resp)["classes"].as_array().cloned().expect("classes");
    let matching: Vec<&Value> = classes.iter().filter(|c| c["id"] == class_id).collect();
    assert_eq!(matching.len(), 1, "class listed exactly once");
    matching[0]["student_count"].as_i64().expect("student_count")
}

#[test]
fn test_create_class_then_list() {
    let env = TestEnv::new();
    env.add_user_with_id(7, "Irina Sergeevna", Role::Teacher);

    let resp = env.classes(
        post()
            .with_query("teacher_id", 7)
            .with_json(&json!({"action": "create_class", "name": " Math 5B "})),
    );
    assert_eq!(resp.status_code, 201);
    let created = body(&resp);
    assert_eq!(created["name"], "Math 5B");
    let class_id = created["id"].as_i64().unwrap();

    let resp = env.classes(get().with_query("teacher_id", 7));
    assert_eq!(resp.status_code, 200);
    let classes = body(&resp)["classes"].clone();
    assert_eq!(classes.as_array().unwrap().len(), 1);
    assert_eq!(classes[0]["id"], class_id);
    assert_eq!(classes[0]["name"], "Math 5B");
    assert_eq!(classes[0]["teacher_id"], 7);
    assert_eq!(classes[0]["student_count"], 0);
    assert!(classes[0]["created_at"].is_string());
}

#[test]
fn test_create_class_blank_name() {
    let env = TestEnv::new();
    env.add_user_with_id(7, "Teacher", Role::Teacher);

    for name in [json!(""), json!("   "), Value::Null] {
        let resp = env.classes(
            post()
                .with_query("teacher_id", 7)
                .with_json(&json!({"action": "create_class", "name": name})),
        );
        assert_eq!(resp.status_code, 400);
        assert_eq!(body(&resp)["error"], "Class name required");
    }

    let resp = env.classes(get().with_query("teacher_id", 7));
    assert_eq!(body(&resp)["classes"], json!([]));
}

#[test]
fn test_create_class_unknown_teacher() {
    let env = TestEnv::new();
    let resp = env.classes(
        post()
            .with_query("teacher_id", 99)
            .with_json(&json!({"action": "create_class", "name": "Ghost"})),
    );
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "Teacher not found");
}

#[test]
fn test_list_requires_teacher_id() {
    let env = TestEnv::new();
    let resp = env.classes(get());
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "teacher_id required");
}

#[test]
fn test_classes_only_for_owner_sorted_by_name() {
    let env = TestEnv::new();
    let t1 = env.add_user("t1@school.test", "First Teacher", Role::Teacher);
    let t2 = env.add_user("t2@school.test", "Second Teacher", Role::Teacher);

    create_class(&env, t1, "Physics 9A");
    create_class(&env, t1, "Algebra 7B");
    create_class(&env, t2, "Chemistry 8C");

    let resp = env.classes(get().with_query("teacher_id", t1));
    let names: Vec<String> = body(&resp)["classes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Algebra 7B", "Physics 9A"]);
}

#[test]
fn test_add_same_student_twice_conflicts() {
    let env = TestEnv::new();
    let teacher = env.add_user("t@school.test", "Teacher", Role::Teacher);
    let student = env.add_user("s@school.test", "Student", Role::Student);
    let class_id = create_class(&env, teacher, "History");

    assert_eq!(add_student(&env, class_id, student), 201);

    let resp = env.classes(post().with_json(&json!({
        "action": "add_student",
        "class_id": class_id,
        "student_id": student
    })));
    assert_eq!(resp.status_code, 409);
    assert_eq!(body(&resp)["error"], "Student already in class");
}

#[test]
fn test_add_student_requires_both_ids() {
    let env = TestEnv::new();
    let resp = env.classes(post().with_json(&json!({"action": "add_student", "class_id": 1})));
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "class_id and student_id required");
}

#[test]
fn test_add_student_unknown_class() {
    let env = TestEnv::new();
    let student = env.add_user("s@school.test", "Student", Role::Student);
    assert_eq!(add_student(&env, 555, student), 400);
}

#[test]
fn test_remove_missing_member_succeeds() {
    let env = TestEnv::new();
    let teacher = env.add_user("t@school.test", "Teacher", Role::Teacher);
    let class_id = create_class(&env, teacher, "Geography");

    assert_eq!(remove_student(&env, class_id, 12345), json!({"success": true}));
}

#[test]
fn test_remove_then_readd() {
    let env = TestEnv::new();
    let teacher = env.add_user("t@school.test", "Teacher", Role::Teacher);
    let student = env.add_user("s@school.test", "Student", Role::Student);
    let class_id = create_class(&env, teacher, "Literature");

    assert_eq!(add_student(&env, class_id, student), 201);
    remove_student(&env, class_id, student);
    assert_eq!(add_student(&env, class_id, student), 201);
    assert_eq!(class_student_ids(&env, class_id), vec![student]);
    assert_eq!(student_count(&env, teacher, class_id), 1);
}

#[test]
fn test_student_count_excludes_removed_members() {
    let env = TestEnv::new();
    let teacher = env.add_user("t@school.test", "Teacher", Role::Teacher);
    let a = env.add_user("a@school.test", "Alexei", Role::Student);
    let b = env.add_user("b@school.test", "Boris", Role::Student);
    let class_id = create_class(&env, teacher, "Music");

    add_student(&env, class_id, a);
    add_student(&env, class_id, b);
    assert_eq!(student_count(&env, teacher, class_id), 2);

    remove_student(&env, class_id, b);
    assert_eq!(student_count(&env, teacher, class_id), 1);

    // Removed rows stay in the table.
    let rows: i64 = env
        .store()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM class_students WHERE class_id = ?1",
            [class_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn test_roster_scenario() {
    let env = TestEnv::new();
    env.add_user_with_id(7, "Teacher", Role::Teacher);
    env.add_user_with_id(42, "Zoya Ivanova", Role::Student);
    let class_id = create_class(&env, 7, "Math 5B");

    assert_eq!(add_student(&env, class_id, 42), 201);
    assert_eq!(class_student_ids(&env, class_id), vec![42]);

    assert_eq!(remove_student(&env, class_id, 42), json!({"success": true}));
    assert!(class_student_ids(&env, class_id).is_empty());
}

#[test]
fn test_class_students_ordered_by_name() {
    let env = TestEnv::new();
    let teacher = env.add_user("t@school.test", "Teacher", Role::Teacher);
    let c = env.add_user("c@school.test", "Vera", Role::Student);
    let a = env.add_user("a@school.test", "Anton", Role::Student);
    let class_id = create_class(&env, teacher, "Art");

    add_student(&env, class_id, c);
    add_student(&env, class_id, a);

    let resp = env.classes(
        get()
            .with_query("action", "students")
            .with_query("class_id", class_id),
    );
    let students = body(&resp)["students"].clone();
    assert_eq!(students[0]["full_name"], "Anton");
    assert_eq!(students[0]["role"], "student");
    assert_eq!(students[1]["full_name"], "Vera");
}

#[test]
fn test_all_students_excludes_teachers() {
    let env = TestEnv::new();
    env.add_user("t@school.test", "Teacher", Role::Teacher);
    env.add_user("b@school.test", "Boris", Role::Student);
    env.add_user("a@school.test", "Anna", Role::Student);

    let resp = env.classes(get().with_query("action", "all_students"));
    assert_eq!(resp.status_code, 200);
    let students = body(&resp)["students"].clone();
    assert_eq!(students.as_array().unwrap().len(), 2);
    assert_eq!(students[0]["full_name"], "Anna");
    assert_eq!(students[0]["email"], "a@school.test");
    assert!(students[0].get("role").is_none());
}

#[test]
fn test_invalid_actions() {
    let env = TestEnv::new();

    let resp = env.classes(get().with_query("action", "everything"));
    assert_eq!(resp.status_code, 400);

    let resp = env.classes(post().with_json(&json!({"action": "remove_student"})));
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "Invalid action");

    let resp = env.classes(delete().with_json(&json!({"action": "add_student"})));
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "Invalid action");
}

#[test]
fn test_invalid_json_body() {
    let env = TestEnv::new();
    let resp = env.classes(post().with_body("{\"action\": "));
    assert_eq!(resp.status_code, 400);
    assert_eq!(body(&resp)["error"], "Invalid JSON body");
}

#[test]
fn test_preflight_and_405_skip_database() {
    let handler = ClassRosterHandler::new(unreachable_database());

    let resp = handler.handle(&options());
    assert_eq!(resp.status_code, 200);
    assert!(resp.body.is_empty());
    assert_eq!(
        resp.headers["Access-Control-Allow-Methods"],
        "GET, POST, DELETE, OPTIONS"
    );
    assert!(!resp.headers.contains_key("Content-Type"));

    let resp = handler.handle(&put());
    assert_eq!(resp.status_code, 405);
    assert_eq!(body(&resp)["error"], "Method not allowed");
    assert_eq!(resp.headers["Access-Control-Allow-Origin"], "*");
}

#[test]
fn test_validation_fails_before_database() {
    let handler = ClassRosterHandler::new(unreachable_database());
    let resp = handler.handle(&get());
    assert_eq!(resp.status_code, 400);
}

#[test]
fn test_unreachable_database_is_500() {
    let handler = ClassRosterHandler::new(unreachable_database());
    let resp = handler.handle(&get().with_query("teacher_id", 1));
    assert_eq!(resp.status_code, 500);
    assert_eq!(body(&resp)["error"], "Internal server error");
}
