//! # CRUD View
//!
//! Request handling shared by every registered model. A request is first
//! checked against the model's allowed verbs, then routed by verb:
//!
//! | verb         | primary key in URL            | no primary key                       |
//! |--------------|-------------------------------|--------------------------------------|
//! | GET / HEAD   | one object (404 when missing) | filtered list                        |
//! | PUT          | creates a new object          | creates a new object                 |
//! | DELETE       | deletes that object           | deletes every match, returns a count |
//!
//! GET and HEAD take their `name::type=value` parameters from the query
//! string. The other verbs take them from the query string and then from the
//! `[key]:=:[value]` body, the body winning on repeated keys.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::Method,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use std::sync::OnceLock;

use crate::core::CrudModel;
use crate::errors::ApiError;
use crate::params::{NAME_TYPE_DELIMITER, ParamValue, RestApiParameter, is_typed_key};
use crate::payload::{PayloadError, parse_payload};
use crate::query::{QueryKwargs, params_to_query_kwargs};
use crate::response::{
    JsonEnvelope, respond_bad_request_verb, respond_list_deleted,
    respond_success_no_results_to_return,
};

/// Per-request state of the view: verb, primary key, raw parameters and the
/// body, parsed at most once.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    pk: i64,
    query: Vec<(String, String)>,
    body: Bytes,
    payload: OnceLock<Result<Vec<(String, String)>, PayloadError>>,
}

impl ApiRequest {
    /// `pk` of 0 means the URL named no object.
    #[must_use]
    pub fn new(method: Method, pk: i64, raw_query: Option<&str>, body: Bytes) -> Self {
        let query = raw_query
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method,
            pk,
            query,
            body,
            payload: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn pk(&self) -> i64 {
        self.pk
    }

    /// Whether the URL names a single object.
    #[must_use]
    pub const fn has_pk(&self) -> bool {
        self.pk > 0
    }

    /// The body as key/value pairs.
    ///
    /// # Errors
    ///
    /// Fails when the body is not in `[key]:=:[value]` form.
    pub fn payload(&self) -> Result<&[(String, String)], PayloadError> {
        self.payload
            .get_or_init(|| parse_payload(&self.body))
            .as_deref()
            .map_err(Clone::clone)
    }

    /// Filter or creation parameters for this request.
    ///
    /// # Errors
    ///
    /// Fails on a malformed key, an unconvertible value or a malformed body.
    pub fn query_kwargs(&self) -> Result<QueryKwargs, ApiError> {
        let mut kwargs = params_to_query_kwargs(self.query.iter().map(|(k, v)| (k, v)))?;
        if self.method == Method::GET || self.method == Method::HEAD {
            return Ok(kwargs);
        }

        for (key, value) in self.payload()? {
            if !key.contains(NAME_TYPE_DELIMITER) {
                kwargs.insert(key.clone(), ParamValue::Str(value.clone()));
            } else if is_typed_key(key) {
                let (name, value) = RestApiParameter::parse(key, value)?.into_key_value();
                kwargs.insert(name, value);
            } else {
                tracing::debug!(key = %key, "Skipping body entry with malformed key");
            }
        }
        Ok(kwargs)
    }
}

/// Whether `method` is one of `allowed_methods`. HEAD is allowed wherever GET is.
#[must_use]
pub fn valid_method(method: &Method, allowed_methods: &[Method]) -> bool {
    allowed_methods.contains(method)
        || (*method == Method::HEAD && allowed_methods.contains(&Method::GET))
}

/// Runs one request against model `M`.
pub async fn dispatch<M: CrudModel>(db: &DatabaseConnection, request: ApiRequest) -> Response {
    if !valid_method(request.method(), &M::allowed_methods()) {
        return respond_bad_request_verb(request.method());
    }

    tracing::debug!(
        model = %M::model_name(),
        method = %request.method(),
        pk = request.pk(),
        "Dispatching CRUD request"
    );

    let result = match *request.method() {
        Method::GET | Method::HEAD => get::<M>(db, &request).await,
        Method::PUT => put::<M>(db, &request).await,
        Method::DELETE => delete::<M>(db, &request).await,
        _ => Err(ApiError::method_not_allowed(request.method().clone())),
    };

    match result {
        Ok(envelope) => envelope.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get<M: CrudModel>(
    db: &DatabaseConnection,
    request: &ApiRequest,
) -> Result<JsonEnvelope, ApiError> {
    let kwargs = request.query_kwargs()?;
    if request.has_pk() {
        let object = M::get_object(db, request.pk(), &kwargs).await?;
        return Ok(JsonEnvelope(M::to_json(&object)?));
    }

    let objects = M::get_object_list(db, &kwargs).await?;
    let list = objects
        .iter()
        .map(M::to_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(JsonEnvelope(serde_json::Value::Array(list)))
}

async fn put<M: CrudModel>(
    db: &DatabaseConnection,
    request: &ApiRequest,
) -> Result<JsonEnvelope, ApiError> {
    let kwargs = request.query_kwargs()?;
    let object = M::create_object(db, &kwargs).await?;
    Ok(JsonEnvelope(M::to_json(&object)?))
}

async fn delete<M: CrudModel>(
    db: &DatabaseConnection,
    request: &ApiRequest,
) -> Result<JsonEnvelope, ApiError> {
    if request.has_pk() {
        M::delete_object(db, request.pk()).await?;
        return Ok(respond_success_no_results_to_return("deleted"));
    }

    let kwargs = request.query_kwargs()?;
    let count = M::delete_object_list(db, &kwargs).await?;
    Ok(respond_list_deleted(count))
}

/// Primary key from a URL segment: decimal digits only.
#[must_use]
pub fn parse_pk(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Handler for `{prefix}{model}`.
pub async fn collection_handler<M: CrudModel>(
    State(db): State<DatabaseConnection>,
    method: Method,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    dispatch::<M>(&db, ApiRequest::new(method, 0, query.as_deref(), body)).await
}

/// Handler for `{prefix}{model}/{pk}`.
pub async fn member_handler<M: CrudModel>(
    State(db): State<DatabaseConnection>,
    method: Method,
    Path(pk): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    let Some(pk) = parse_pk(&pk) else {
        return ApiError::not_found(M::model_name(), Some(pk)).into_response();
    };
    dispatch::<M>(&db, ApiRequest::new(method, pk, query.as_deref(), body)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, query: Option<&str>, body: &'static str) -> ApiRequest {
        ApiRequest::new(method, 0, query, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_valid_method() {
        let allowed = [Method::GET, Method::PUT];
        assert!(valid_method(&Method::GET, &allowed));
        assert!(!valid_method(&Method::POST, &allowed));
        assert!(!valid_method(&Method::DELETE, &[]));
    }

    #[test]
    fn test_head_follows_get() {
        assert!(valid_method(&Method::HEAD, &[Method::GET]));
        assert!(!valid_method(&Method::HEAD, &[Method::PUT, Method::DELETE]));
    }

    #[test]
    fn test_parse_pk() {
        assert_eq!(parse_pk("5"), Some(5));
        assert_eq!(parse_pk("0"), Some(0));
        assert_eq!(parse_pk(""), None);
        assert_eq!(parse_pk("-5"), None);
        assert_eq!(parse_pk("+5"), None);
        assert_eq!(parse_pk("abc"), None);
        assert_eq!(parse_pk("99999999999999999999999"), None);
    }

    #[test]
    fn test_get_reads_query_string_only() {
        let req = request(Method::GET, Some("age%3A%3Aint=21"), "[name::str]:=:[Bob]");
        let kwargs = req.query_kwargs().unwrap();
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs.get("age"), Some(&ParamValue::Int(21)));
    }

    #[test]
    fn test_get_rejects_untyped_query_key() {
        let req = request(Method::GET, Some("age=21"), "");
        assert!(req.query_kwargs().is_err());
    }

    #[test]
    fn test_body_keys_without_delimiter_are_strings() {
        let req = request(Method::PUT, None, "[name]:=:[Alice]");
        let kwargs = req.query_kwargs().unwrap();
        assert_eq!(kwargs.get("name"), Some(&ParamValue::Str("Alice".to_string())));
    }

    #[test]
    fn test_body_skips_keys_with_extra_delimiters() {
        let req = request(Method::DELETE, None, "[a::b::c]:=:[1]\n[age::int]:=:[3]");
        let kwargs = req.query_kwargs().unwrap();
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs.get("age"), Some(&ParamValue::Int(3)));
    }

    #[test]
    fn test_body_overrides_query_string() {
        let req = request(Method::DELETE, Some("age::int=1"), "[age::int]:=:[2]");
        let kwargs = req.query_kwargs().unwrap();
        assert_eq!(kwargs.get("age"), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn test_bad_type_in_body_is_an_error() {
        let req = request(Method::PUT, None, "[age::number]:=:[2]");
        assert!(req.query_kwargs().is_err());
    }

    #[test]
    fn test_payload_is_parsed_once() {
        let req = request(Method::PUT, None, "[a]:=:[1]");
        let first = req.payload().unwrap().as_ptr();
        let second = req.payload().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let req = request(Method::PUT, None, "not a payload");
        assert!(matches!(
            req.payload(),
            Err(PayloadError::MalformedEntry { .. })
        ));
    }
}
