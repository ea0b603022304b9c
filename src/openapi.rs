//! OpenAPI document for the generated routes.
//!
//! Built at runtime from the registered [`CrudRoute`]s since models are only
//! known once they are registered. Every allowed verb gets an operation on
//! both the collection and the member path.

use axum::http::Method;
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, HttpMethod, InfoBuilder, OpenApi, OpenApiBuilder,
    PathItem, PathsBuilder, Ref, Required, Response, ResponseBuilder,
    path::{Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder},
    schema::{ObjectBuilder, Schema, Type},
};

use crate::errors::ErrorResponse;
use crate::params::ParamType;
use crate::response::{Deleted, ListDeleted};
use crate::routes::CrudRoute;

const JSON: &str = "application/json";

/// OpenAPI document titled `title` describing `routes`.
#[must_use]
pub fn crud_openapi(title: &str, routes: &[CrudRoute]) -> OpenApi {
    let mut paths = PathsBuilder::new();
    for route in routes {
        paths = paths
            .path(&route.collection_path, path_item(route, false))
            .path(&route.member_path, path_item(route, true));
    }

    let components = ComponentsBuilder::new()
        .schema_from::<ErrorResponse>()
        .schema_from::<Deleted>()
        .schema_from::<ListDeleted>()
        .build();

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(title)
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .paths(paths.build())
        .components(Some(components))
        .build()
}

/// utoipa's equivalent of `method`, if it has one.
#[must_use]
pub fn http_method(method: &Method) -> Option<HttpMethod> {
    match *method {
        Method::GET => Some(HttpMethod::Get),
        Method::HEAD => Some(HttpMethod::Head),
        Method::PUT => Some(HttpMethod::Put),
        Method::DELETE => Some(HttpMethod::Delete),
        Method::POST => Some(HttpMethod::Post),
        Method::PATCH => Some(HttpMethod::Patch),
        Method::OPTIONS => Some(HttpMethod::Options),
        Method::TRACE => Some(HttpMethod::Trace),
        _ => None,
    }
}

fn path_item(route: &CrudRoute, member: bool) -> PathItem {
    let mut builder = PathItemBuilder::new();
    for method in &route.allowed_methods {
        if let Some(http_method) = http_method(method) {
            builder = builder.operation(http_method, operation(route, method, member));
        }
    }
    builder.build()
}

fn operation(route: &CrudRoute, method: &Method, member: bool) -> Operation {
    let suffix = if member { "_pk" } else { "" };
    let mut builder = OperationBuilder::new()
        .operation_id(Some(format!(
            "{}{suffix}_{}",
            route.name,
            method.as_str().to_lowercase()
        )))
        .tag(route.model.clone())
        .summary(Some(summary(&route.model, method, member)))
        .description(Some(format!(
            "Parameters are `name::type` keys, type being one of {}.",
            ParamType::ALL.map(ParamType::as_str).join(", ")
        )));

    if member {
        builder = builder.parameter(
            ParameterBuilder::new()
                .name("pk")
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .schema(Some(Schema::Object(
                    ObjectBuilder::new().schema_type(Type::Integer).build(),
                ))),
        );
    }

    for (status, response) in responses(method, member) {
        builder = builder.response(status, response);
    }
    builder.build()
}

fn summary(model: &str, method: &Method, member: bool) -> String {
    match (method.as_str(), member) {
        ("GET" | "HEAD", false) => format!("List {model} objects matching the parameters"),
        ("GET" | "HEAD", true) => format!("Get one {model} by primary key"),
        ("PUT", _) => format!("Create a {model} from the parameters"),
        ("DELETE", false) => format!("Delete every {model} matching the parameters"),
        ("DELETE", true) => format!("Delete one {model} by primary key"),
        (other, _) => format!("{other} is accepted but has no handler"),
    }
}

fn responses(method: &Method, member: bool) -> Vec<(&'static str, Response)> {
    let mut responses = match *method {
        Method::GET | Method::HEAD | Method::PUT => {
            vec![("200", json_response("Object(s) wrapped in {\"response\": ...}", None))]
        }
        Method::DELETE if member => vec![(
            "200",
            json_response("Object deleted", Some("Deleted")),
        )],
        Method::DELETE => vec![(
            "200",
            json_response("Number of deleted objects", Some("ListDeleted")),
        )],
        _ => vec![(
            "405",
            json_response("Verb accepted but not handled", Some("ErrorResponse")),
        )],
    };

    if member && *method != Method::PUT {
        responses.push((
            "404",
            json_response("No object with that primary key", Some("ErrorResponse")),
        ));
    }
    responses.push((
        "500",
        json_response("Malformed parameters or database error", Some("ErrorResponse")),
    ));
    responses
}

fn json_response(description: &str, schema: Option<&str>) -> Response {
    let mut content = ContentBuilder::new();
    if let Some(name) = schema {
        content = content.schema(Some(Ref::from_schema_name(name)));
    }
    ResponseBuilder::new()
        .description(description)
        .content(JSON, content.build())
        .build()
}
