use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::models::{Student, Subject};

/// Marker the portal puts in the login response when the credentials were
/// accepted.
const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("the portal rejected the credentials")]
    InvalidCredentials,
    #[error("the portal returned an unusable response")]
    InvalidResponse,
}

/// Pick the registration ID of the most recent academic year from the
/// portal's registration document.
///
/// The "most recent" entry is the one whose REGISTRATIONDATEFROM string is
/// lexicographically greatest; ties go to the last such entry. This is only
/// correct for zero-padded sortable dates (YYYY-MM-DD), which is what the
/// portal emits.
pub fn select_registration_id(raw: &str) -> Result<String, PortalError> {
    let doc: Value = serde_json::from_str(raw).map_err(|_| PortalError::InvalidResponse)?;
    if !doc.is_object() {
        return Err(PortalError::InvalidResponse);
    }

    // A lookup against unknown credentials answers with a document that has
    // no "studentdata" member at all.
    let years = doc.get("studentdata").ok_or(PortalError::InvalidCredentials)?;
    let years = years.as_array().ok_or(PortalError::InvalidResponse)?;
    if years.is_empty() {
        return Err(PortalError::InvalidResponse);
    }

    let mut latest: Option<(&str, &str)> = None;
    for year in years {
        let id = require_str(year, "REGISTRATIONID")?;
        let from = require_str(year, "REGISTRATIONDATEFROM")?;
        if latest.map_or(true, |(best, _)| from >= best) {
            latest = Some((from, id));
        }
    }

    let (_, id) = latest.ok_or(PortalError::InvalidResponse)?;
    Ok(id.to_string())
}

/// Build a Student from the login document, then fold in whatever the
/// attendance document yields. A bad login propagates; a bad attendance
/// grid is absorbed and leaves the subjects empty.
pub fn parse_student(login_json: &str, attendance_json: &str) -> Result<Student, PortalError> {
    let mut student = parse_login(login_json)?;
    refresh_attendance(&mut student, attendance_json);
    Ok(student)
}

/// Merge a fresh attendance document into an existing student. Rows keyed
/// by an already-known subject code replace that subject; unknown codes are
/// added. An unusable document is discarded and the student is left as-is.
pub fn refresh_attendance(student: &mut Student, attendance_json: &str) {
    match parse_attendance(attendance_json) {
        Ok(update) => student.merge_subjects(update),
        Err(err) => {
            log::warn!("discarding attendance update for {}: {}", student.name, err);
        }
    }
}

fn parse_login(raw: &str) -> Result<Student, PortalError> {
    let doc: Value = serde_json::from_str(raw).map_err(|_| PortalError::InvalidResponse)?;
    if doc.get("status").is_none() || doc.get("name").is_none() {
        return Err(PortalError::InvalidResponse);
    }
    if doc.get("status").and_then(Value::as_str) != Some(STATUS_SUCCESS) {
        return Err(PortalError::InvalidCredentials);
    }

    let name = require_str(&doc, "name")?;
    Ok(Student::new(capitalize_fully(name)))
}

fn parse_attendance(raw: &str) -> Result<HashMap<String, Subject>, PortalError> {
    let doc: Value = serde_json::from_str(raw).map_err(|_| PortalError::InvalidResponse)?;
    let grid = doc
        .get("griddata")
        .and_then(Value::as_array)
        .ok_or(PortalError::InvalidResponse)?;

    let mut subjects = HashMap::new();
    for row in grid {
        // All four fields must exist. Latt/Patt may still hold junk; that is
        // tolerated per-field below.
        let theory = require_field(row, "Latt")?;
        let lab = require_field(row, "Patt")?;
        let name = require_str(row, "subject")?;
        let code = require_str(row, "subjectcode")?;

        let mut subject = Subject::new(name, code);
        if let Some((present, total)) = theory.as_str().and_then(parse_class_counts) {
            subject.theory_present = present;
            subject.theory_total = total;
        }
        if let Some((present, total)) = lab.as_str().and_then(parse_class_counts) {
            subject.lab_present = present;
            subject.lab_total = total;
        }

        // Later rows with the same code win.
        subjects.insert(subject.code.clone(), subject);
    }

    Ok(subjects)
}

fn require_field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, PortalError> {
    value.get(key).ok_or(PortalError::InvalidResponse)
}

fn require_str<'a>(value: &'a Value, key: &str) -> Result<&'a str, PortalError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or(PortalError::InvalidResponse)
}

// "jOHN  doe" -> "John  Doe". Word breaks follow whitespace only; interior
// whitespace is kept as received.
fn capitalize_fully(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

// The portal renders a counter pair as "<present> / <total>", e.g. "23 / 30".
// Anything else ("", "NA", extra spacing, non-digits) is not a match.
fn parse_class_counts(s: &str) -> Option<(u32, u32)> {
    let (present, total) = s.split_once(" / ")?;
    Some((parse_count(present)?, parse_count(total)?))
}

fn parse_count(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
