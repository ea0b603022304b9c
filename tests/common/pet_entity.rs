use axum::http::Method;
use ezi::CrudModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pet")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Read-only through the API. POST is accepted but has no handler.
impl CrudModel for Entity {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    fn allowed_methods() -> Vec<Method> {
        vec![Method::GET, Method::POST]
    }
}
