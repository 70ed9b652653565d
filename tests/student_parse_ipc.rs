use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rollcalld");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rollcalld");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn error_code(resp: &serde_json::Value) -> &str {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn login_ok() -> String {
    json!({ "status": "success", "name": "jane ROE" }).to_string()
}

#[test]
fn rejected_login_surfaces_invalid_credentials() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let login = json!({ "status": "failure", "name": "jane ROE" });
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.parse",
        json!({
            "loginResponse": login.to_string(),
            "attendanceResponse": "{}"
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(error_code(&resp), "invalid_credentials");

    // The failed parse must not leave a student behind.
    let fetched = request(&mut stdin, &mut reader, "2", "student.get", json!({}));
    assert_eq!(error_code(&fetched), "no_student");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn garbage_login_surfaces_invalid_response() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.parse",
        json!({
            "loginResponse": "this is not json",
            "attendanceResponse": "{}"
        }),
    );
    assert_eq!(error_code(&resp), "invalid_response");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn broken_attendance_still_yields_a_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.parse",
        json!({
            "loginResponse": login_ok(),
            "attendanceResponse": "{ \"nogrid\": true }"
        }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(resp["result"]["student"]["name"].as_str(), Some("Jane Roe"));
    assert_eq!(
        resp["result"]["student"]["subjects"]
            .as_array()
            .map(|a| a.len()),
        Some(0)
    );

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn refresh_requires_a_parsed_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.refresh",
        json!({ "attendanceResponse": "{}" }),
    );
    assert_eq!(error_code(&resp), "no_student");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn failed_refresh_keeps_previous_subjects() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let attendance = json!({
        "griddata": [
            { "subject": "Operating Systems", "subjectcode": "CS230", "Latt": "11 / 14", "Patt": "3 / 3" },
        ]
    });
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.parse",
        json!({
            "loginResponse": login_ok(),
            "attendanceResponse": attendance.to_string()
        }),
    );

    // A grid that fails validation mid-way (missing Patt) is discarded whole.
    let broken = json!({
        "griddata": [
            { "subject": "Operating Systems", "subjectcode": "CS230", "Latt": "12 / 15" },
        ]
    });
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "student.refresh",
        json!({ "attendanceResponse": broken.to_string() }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(true));
    let subjects = resp["result"]["student"]["subjects"]
        .as_array()
        .expect("subjects array");
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["theoryPresent"].as_u64(), Some(11));
    assert_eq!(subjects[0]["theoryTotal"].as_u64(), Some(14));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn missing_params_are_rejected() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "student.parse",
        json!({ "loginResponse": login_ok() }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let resp = request(&mut stdin, &mut reader, "2", "student.refresh", json!({}));
    assert_eq!(error_code(&resp), "bad_params");

    drop(stdin);
    let _ = child.wait();
}
