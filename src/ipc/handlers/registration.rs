use serde_json::json;

use crate::ipc::error::{err, ok, portal_err};
use crate::ipc::types::{AppState, Request};
use crate::portal;

/// `registration.select` — pick the current academic year's registration ID
/// out of the portal's registration document, passed through verbatim as a
/// raw JSON string.
fn handle_registration_select(req: &Request) -> serde_json::Value {
    let Some(response) = req.params.get("response").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing response", None);
    };

    match portal::select_registration_id(response) {
        Ok(registration_id) => ok(&req.id, json!({ "registrationId": registration_id })),
        Err(e) => portal_err(&req.id, e),
    }
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "registration.select" => Some(handle_registration_select(req)),
        _ => None,
    }
}
