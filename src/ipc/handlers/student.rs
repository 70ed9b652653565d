use serde_json::json;

use crate::ipc::error::{err, ok, portal_err};
use crate::ipc::types::{AppState, Request};
use crate::models::Student;
use crate::portal;

fn student_json(student: &Student) -> serde_json::Value {
    let mut subjects: Vec<_> = student.subjects.values().collect();
    // Stable order so the shell can diff consecutive responses.
    subjects.sort_by(|a, b| a.code.cmp(&b.code));

    let subjects: Vec<serde_json::Value> = subjects
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "code": s.code,
                "theoryPresent": s.theory_present,
                "theoryTotal": s.theory_total,
                "labPresent": s.lab_present,
                "labTotal": s.lab_total,
                "lastUpdated": s.last_updated
            })
        })
        .collect();

    json!({
        "name": student.name,
        "subjects": subjects
    })
}

fn get_required_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// `student.parse` — assemble a fresh student from a login document plus an
/// attendance document. A rejected login surfaces as an error; a broken
/// attendance grid degrades to a student with no subjects.
fn handle_student_parse(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(login) = get_required_str(&req.params, "loginResponse") else {
        return err(&req.id, "bad_params", "missing loginResponse", None);
    };
    let Some(attendance) = get_required_str(&req.params, "attendanceResponse") else {
        return err(&req.id, "bad_params", "missing attendanceResponse", None);
    };

    match portal::parse_student(&login, &attendance) {
        Ok(student) => {
            let resp = ok(&req.id, json!({ "student": student_json(&student) }));
            state.student = Some(student);
            resp
        }
        Err(e) => portal_err(&req.id, e),
    }
}

/// `student.refresh` — merge a new attendance document into the student
/// parsed earlier. Unusable documents leave the student as it was.
fn handle_student_refresh(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(attendance) = get_required_str(&req.params, "attendanceResponse") else {
        return err(&req.id, "bad_params", "missing attendanceResponse", None);
    };
    let Some(student) = state.student.as_mut() else {
        return err(&req.id, "no_student", "parse a login first", None);
    };

    portal::refresh_attendance(student, &attendance);
    ok(&req.id, json!({ "student": student_json(student) }))
}

fn handle_student_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.student.as_ref() {
        Some(student) => ok(&req.id, json!({ "student": student_json(student) })),
        None => err(&req.id, "no_student", "parse a login first", None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "student.parse" => Some(handle_student_parse(state, req)),
        "student.refresh" => Some(handle_student_refresh(state, req)),
        "student.get" => Some(handle_student_get(state, req)),
        _ => None,
    }
}
