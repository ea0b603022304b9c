//! # URL Factory
//!
//! Generates two routes per registered model:
//!
//! - `{prefix}{model}`: the model's collection
//! - `{prefix}{model}/{pk}`: one object, `pk` being decimal digits
//!
//! ```rust,ignore
//! let app = CrudApi::new(ApiConfig::default())
//!     .register::<person::Entity>()
//!     .register::<pet::Entity>()
//!     .into_router(&db);
//! // GET /api/crud/person, GET /api/crud/person/5, PUT /api/crud/pet, ...
//! ```

use axum::{Router, extract::DefaultBodyLimit, http::Method, routing::any};
use sea_orm::DatabaseConnection;
use utoipa::openapi::OpenApi;

use crate::config::ApiConfig;
use crate::core::CrudModel;
use crate::view::{collection_handler, member_handler};

/// Description of the routes generated for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrudRoute {
    /// Collection path with slashes turned into underscores, e.g. `api_crud_person`
    pub name: String,
    pub model: String,
    pub collection_path: String,
    pub member_path: String,
    pub allowed_methods: Vec<Method>,
}

impl CrudRoute {
    #[must_use]
    pub fn for_model<M: CrudModel>(url_prefix: &str) -> Self {
        let model = M::model_name();
        let collection_path = collection_path(url_prefix, &model);
        Self {
            name: route_name(&collection_path),
            member_path: format!("{collection_path}/{{pk}}"),
            collection_path,
            model,
            allowed_methods: M::allowed_methods(),
        }
    }
}

/// `/{prefix}{model}`; the prefix is used as given apart from a leading slash.
#[must_use]
pub fn collection_path(url_prefix: &str, model: &str) -> String {
    format!("/{}{model}", url_prefix.trim_start_matches('/'))
}

/// Name of a route, for lookups by name.
#[must_use]
pub fn route_name(path: &str) -> String {
    path.trim_matches('/').replace('/', "_")
}

/// Router serving model `M` under `url_prefix`.
pub fn model_crud_router<M: CrudModel>(url_prefix: &str) -> Router<DatabaseConnection> {
    let route = CrudRoute::for_model::<M>(url_prefix);
    Router::new()
        .route(&route.collection_path, any(collection_handler::<M>))
        .route(&route.member_path, any(member_handler::<M>))
}

/// Collects models and builds the router serving all of them.
#[derive(Debug)]
pub struct CrudApi {
    config: ApiConfig,
    routes: Vec<CrudRoute>,
    router: Router<DatabaseConnection>,
}

impl Default for CrudApi {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl CrudApi {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            router: Router::new(),
        }
    }

    /// Adds the routes of model `M`. Models whose `exposed()` is false are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the same model name is registered twice.
    #[must_use]
    pub fn register<M: CrudModel>(mut self) -> Self {
        if !M::exposed() {
            tracing::debug!(model = %M::model_name(), "Model not exposed, no routes generated");
            return self;
        }

        let route = CrudRoute::for_model::<M>(&self.config.url_prefix);
        tracing::debug!(
            model = %route.model,
            path = %route.collection_path,
            name = %route.name,
            "Registered CRUD routes"
        );
        self.router = self
            .router
            .merge(model_crud_router::<M>(&self.config.url_prefix));
        self.routes.push(route);
        self
    }

    #[must_use]
    pub fn routes(&self) -> &[CrudRoute] {
        &self.routes
    }

    /// Route registered under `name`.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&CrudRoute> {
        self.routes.iter().find(|route| route.name == name)
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// OpenAPI description of every registered route.
    #[must_use]
    pub fn openapi(&self) -> OpenApi {
        crate::openapi::crud_openapi(&self.config.title, &self.routes)
    }

    /// Final router, bound to `db`.
    pub fn into_router(self, db: &DatabaseConnection) -> Router {
        self.router
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .with_state(db.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_path() {
        assert_eq!(collection_path("api/crud/", "person"), "/api/crud/person");
        assert_eq!(collection_path("/api/", "person"), "/api/person");
        assert_eq!(collection_path("", "person"), "/person");
    }

    #[test]
    fn test_route_name() {
        assert_eq!(route_name("/api/crud/person"), "api_crud_person");
        assert_eq!(route_name("/person"), "person");
    }
}
