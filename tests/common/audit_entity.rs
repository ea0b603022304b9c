use ezi::CrudModel;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Never exposed: registering it generates no routes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "audit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl CrudModel for Entity {
    type Entity = Entity;
    type Model = Model;
    type ActiveModel = ActiveModel;

    fn exposed() -> bool {
        false
    }
}
