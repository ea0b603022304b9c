use axum::{
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Indentation applied to every JSON response body.
const JSON_INDENT: &[u8] = b"    ";

/// JSON body wrapped as `{"response": ...}` and pretty printed with a
/// four-space indent. Every successful CRUD reply goes through this type.
#[derive(Debug, Clone)]
pub struct JsonEnvelope(pub serde_json::Value);

#[derive(Serialize)]
struct Envelope<'a> {
    response: &'a serde_json::Value,
}

impl JsonEnvelope {
    /// Wraps any serializable value.
    ///
    /// # Errors
    ///
    /// Fails if `value` cannot be represented as JSON.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self)
    }

    /// Renders the indented body.
    ///
    /// # Errors
    ///
    /// Fails if the wrapped value cannot be written as JSON.
    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut body = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
        Envelope {
            response: &self.0,
        }
        .serialize(&mut serializer)?;
        Ok(body)
    }
}

impl IntoResponse for JsonEnvelope {
    fn into_response(self) -> Response {
        match self.to_body() {
            Ok(body) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                body,
            )
                .into_response(),
            Err(err) => crate::ApiError::from(err).into_response(),
        }
    }
}

/// Reply to a single-object action that has nothing else to return,
/// e.g. `{"deleted": true}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Deleted {
    pub deleted: bool,
}

/// Reply to a bulk delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListDeleted {
    pub deleted: bool,
    pub number_entries_affected: u64,
}

/// 400 for a verb the view does not accept, as plain text.
#[must_use]
pub fn respond_bad_request_verb(method: &Method) -> Response {
    tracing::warn!(method = %method, "Rejected request with disallowed method");
    (
        StatusCode::BAD_REQUEST,
        format!("This page does not support the method \"{method}\""),
    )
        .into_response()
}

/// `{"response": {"<action>": true}}`
#[must_use]
pub fn respond_success_no_results_to_return(action: &str) -> JsonEnvelope {
    let mut object = serde_json::Map::new();
    object.insert(action.to_string(), serde_json::Value::Bool(true));
    JsonEnvelope(serde_json::Value::Object(object))
}

/// `{"response": {"deleted": true, "number_entries_affected": count}}`
#[must_use]
pub fn respond_list_deleted(count: u64) -> JsonEnvelope {
    JsonEnvelope(serde_json::json!({
        "deleted": true,
        "number_entries_affected": count,
    }))
}
