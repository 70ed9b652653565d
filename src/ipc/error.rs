use serde_json::json;

use crate::portal::PortalError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Stable wire codes for the two ways a portal document can be unusable.
pub fn portal_err(id: &str, e: PortalError) -> serde_json::Value {
    let code = match e {
        PortalError::InvalidCredentials => "invalid_credentials",
        PortalError::InvalidResponse => "invalid_response",
    };
    err(id, code, e.to_string(), None)
}
