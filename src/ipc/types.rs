use serde::Deserialize;

use crate::models::Student;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The most recently parsed student, kept so the shell can refresh
/// attendance without replaying the login document.
pub struct AppState {
    pub student: Option<Student>,
}
