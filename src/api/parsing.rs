use serde_json::Value;

use crate::errors::LaughGenError;
use crate::utils::links::extract_post_id;

const POST_KEYS: [&str; 2] = ["post_url", "post_id"];

/// The request document: the decoded `body` of an API Gateway proxy event,
/// or the event itself for direct invocations.
pub fn request_document(payload: &Value) -> Result<Value, LaughGenError> {
    match payload.get("body") {
        Some(Value::String(body)) if body.trim().is_empty() => Ok(Value::Object(Default::default())),
        Some(Value::String(body)) => serde_json::from_str(body)
            .map_err(|e| LaughGenError::InputError(format!("body is not valid JSON: {e}"))),
        Some(Value::Object(_)) => Ok(payload["body"].clone()),
        Some(Value::Null) | None => Ok(payload.clone()),
        Some(_) => Err(LaughGenError::InputError("unsupported body format".to_string())),
    }
}

/// Post id named by a single-item request.
///
/// # Errors
///
/// Returns `InputError` if neither `post_url` nor `post_id` is present, or
/// the value does not identify a post.
pub fn requested_post_id(payload: &Value) -> Result<String, LaughGenError> {
    let doc = request_document(payload)?;
    let Some(raw) = POST_KEYS
        .iter()
        .find_map(|key| doc.get(key).and_then(Value::as_str))
    else {
        return Err(LaughGenError::InputError(
            "missing 'post_url' or 'post_id'".to_string(),
        ));
    };

    extract_post_id(raw)
        .ok_or_else(|| LaughGenError::InputError(format!("cannot find a post id in '{raw}'")))
}
