//! Helpers for building requests against the generated endpoints, for Rust
//! clients and tests.

use url::form_urlencoded;

use crate::params::{ParamValue, RestApiParameter};
use crate::payload;
use crate::routes::collection_path;

/// Parameter names moved into the URL path when a request targets one object.
const PK_NAMES: [&str; 2] = ["pk", "id"];

/// URL of a model's collection, or of one object when `pk` is given.
#[must_use]
pub fn model_url(url_prefix: &str, model: &str, pk: Option<i64>) -> String {
    let collection = collection_path(url_prefix, model);
    match pk {
        Some(pk) => format!("{collection}/{pk}"),
        None => collection,
    }
}

/// Path suffix and query string for `params`.
///
/// With `pk_in_url`, an integer `pk` or `id` parameter becomes a `/<pk>`
/// path segment instead of a query parameter. Returns an empty string when
/// there is nothing to send.
///
/// ```rust,ignore
/// let params = [
///     RestApiParameter::from_value("pk", 5),
///     RestApiParameter::from_value("name", "Bob"),
/// ];
/// assert_eq!(build_get_params(&params, true), "/5?name%3A%3Astr=Bob");
/// ```
#[must_use]
pub fn build_get_params(params: &[RestApiParameter], pk_in_url: bool) -> String {
    let pk_index = pk_in_url
        .then(|| params.iter().position(is_pk_param))
        .flatten();

    let mut url = String::new();
    if let Some(index) = pk_index {
        url.push('/');
        url.push_str(&params[index].value().format());
    }

    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut has_query = false;
    for (index, param) in params.iter().enumerate() {
        if Some(index) == pk_index {
            continue;
        }
        let (key, value) = param.format();
        query.append_pair(&key, &value);
        has_query = true;
    }

    if has_query {
        url.push('?');
        url.push_str(&query.finish());
    }
    url
}

/// Request body carrying `params`.
#[must_use]
pub fn encode_payload(params: &[RestApiParameter]) -> String {
    payload::encode_payload(params.iter().map(RestApiParameter::format))
}

fn is_pk_param(param: &RestApiParameter) -> bool {
    PK_NAMES.contains(&param.name())
        && matches!(param.value(), ParamValue::Int(_) | ParamValue::Fk(_))
}
