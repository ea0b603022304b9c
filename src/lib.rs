//! # ezi
//!
//! REST CRUD endpoints for Sea-ORM entities, served with Axum.
//!
//! Each registered model gets `{prefix}{model}` and `{prefix}{model}/{pk}`.
//! Parameters are typed through their key, `name::type=value`, with `type`
//! one of `int`, `str`, `bool`, `date`, `fk` or `fl`. Bodies of non-GET
//! requests are lines of `[key]:=:[value]`. Every successful reply is wrapped
//! as `{"response": ...}`.
//!
//! ```rust,ignore
//! impl ezi::CrudModel for person::Entity {
//!     type Entity = person::Entity;
//!     type Model = person::Model;
//!     type ActiveModel = person::ActiveModel;
//! }
//!
//! let app = ezi::CrudApi::new(ezi::ApiConfig::from_env()?)
//!     .register::<person::Entity>()
//!     .into_router(&db);
//! // GET /api/crud/person?age::int=21
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod openapi;
pub mod params;
pub mod payload;
pub mod query;
pub mod response;
pub mod routes;
pub mod view;

pub use crate::config::ApiConfig;
pub use crate::core::CrudModel;
pub use crate::errors::ApiError;
pub use crate::params::{ParamError, ParamType, ParamValue, RestApiParameter, UnknownParamType};
pub use crate::query::QueryKwargs;
pub use crate::response::JsonEnvelope;
pub use crate::routes::{CrudApi, CrudRoute, model_crud_router};
