#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{NaiveDate, NaiveDateTime};
use ezi::{ApiConfig, CrudApi};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use tower::ServiceExt;

pub mod audit_entity;
pub mod person_entity;
pub mod pet_entity;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Database holding four people and two pets:
///
/// | id | name  | age | active | height | born             |
/// |----|-------|-----|--------|--------|------------------|
/// | 1  | Alice | 21  | true   | 1.70   | 21/11/2006 16:30 |
/// | 2  | Bob   | 21  | false  |        |                  |
/// | 3  | Carol | 35  | true   | 1.62   |                  |
/// | 4  | dave  | 40  | false  |        |                  |
pub async fn setup_seeded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    let people = [
        ("Alice", 21, true, Some(1.70), Some(alice_birth())),
        ("Bob", 21, false, None, None),
        ("Carol", 35, true, Some(1.62), None),
        ("dave", 40, false, None, None),
    ];
    for (name, age, active, height, born) in people {
        person_entity::ActiveModel {
            name: Set(name.to_string()),
            age: Set(age),
            active: Set(active),
            height: Set(height),
            born: Set(born),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    for (name, owner_id) in [("Rex", 1), ("Tom", 3)] {
        pet_entity::ActiveModel {
            name: Set(name.to_string()),
            owner_id: Set(owner_id),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    Ok(db)
}

pub fn alice_birth() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2006, 11, 21)
        .unwrap()
        .and_hms_opt(16, 30, 0)
        .unwrap()
}

pub fn setup_test_app(db: &DatabaseConnection) -> Router {
    setup_app_with_config(db, ApiConfig::default())
}

pub fn setup_app_with_config(db: &DatabaseConnection, config: ApiConfig) -> Router {
    test_api(config).into_router(db)
}

pub fn test_api(config: ApiConfig) -> CrudApi {
    CrudApi::new(config)
        .register::<person_entity::Entity>()
        .register::<pet_entity::Entity>()
        .register::<audit_entity::Entity>()
}

/// Sends one request and returns the status and the body as text.
pub async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// The value under `"response"` in a successful reply.
pub fn response_value(body: &str) -> serde_json::Value {
    let mut value: serde_json::Value = serde_json::from_str(body).unwrap();
    value["response"].take()
}

/// The `"error"` message of a failed reply.
pub fn error_message(body: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    value["error"].as_str().unwrap().to_string()
}

/// Names of the people in a list reply, in order.
pub fn names(body: &str) -> Vec<String> {
    response_value(body)
        .as_array()
        .unwrap()
        .iter()
        .map(|person| person["name"].as_str().unwrap().to_string())
        .collect()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreatePersonTable), Box::new(CreatePetTable)]
    }
}

pub struct CreatePersonTable;

impl MigrationName for CreatePersonTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_person_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePersonTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Person::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Person::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Person::Name).string().not_null().default(""))
            .col(ColumnDef::new(Person::Age).integer().not_null().default(0))
            .col(
                ColumnDef::new(Person::Active)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(ColumnDef::new(Person::Height).double().null())
            .col(ColumnDef::new(Person::Born).date_time().null())
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Person::Table).to_owned())
            .await
    }
}

pub struct CreatePetTable;

impl MigrationName for CreatePetTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_pet_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePetTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Pet::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Pet::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Pet::Name).string().not_null().default(""))
            .col(ColumnDef::new(Pet::OwnerId).integer().not_null().default(0))
            .to_owned();

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pet::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Person {
    Table,
    Id,
    Name,
    Age,
    Active,
    Height,
    Born,
}

#[derive(DeriveIden)]
enum Pet {
    Table,
    Id,
    Name,
    OwnerId,
}
