//! People API served by ezi
//!
//! ```bash
//! cargo run --example people_api
//! EZI_URL_PREFIX=api/v2/ DATABASE_URL=sqlite://people.db?mode=rwc cargo run --example people_api
//! ```
//!
//! Then try:
//! - `curl 'http://localhost:3000/api/crud/person?age::int=21'`
//! - `curl -X PUT http://localhost:3000/api/crud/person --data-binary $'[name]:=:[Ada]\n[age::int]:=:[36]'`
//! - `curl -X DELETE http://localhost:3000/api/crud/person/1`
//! - `curl http://localhost:3000/openapi.json`

use axum::{Json, Router, routing::get};
use ezi::{ApiConfig, CrudApi, CrudModel};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::env;

mod person {
    use super::{CrudModel, Deserialize, Serialize};
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
    #[sea_orm(table_name = "person")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub age: i32,
        pub active: bool,
        pub height: Option<f64>,
        pub born: Option<DateTime>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl CrudModel for Entity {
        type Entity = Entity;
        type Model = Model;
        type ActiveModel = ActiveModel;
    }
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(sea_orm::Statement::from_string(
        db.get_database_backend(),
        r"CREATE TABLE IF NOT EXISTS person (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            age INTEGER NOT NULL DEFAULT 0,
            active BOOLEAN NOT NULL DEFAULT FALSE,
            height REAL,
            born TEXT
        );"
        .to_owned(),
    ))
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .compact()
        .init();

    let config = ApiConfig::from_env()?;
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let db = Database::connect(&database_url).await?;
    create_tables(&db).await?;

    let api = CrudApi::new(config).register::<person::Entity>();
    for route in api.routes() {
        tracing::info!(name = %route.name, path = %route.collection_path, "Serving");
    }

    let openapi = Json(api.openapi());
    let app = Router::new()
        .route(
            "/openapi.json",
            get(move || {
                let openapi = openapi.clone();
                async move { openapi }
            }),
        )
        .merge(api.into_router(&db));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
