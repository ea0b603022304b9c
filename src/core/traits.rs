use async_trait::async_trait;
use axum::http::Method;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    EntityName, EntityTrait, FromQueryResult, IntoActiveModel, Iterable, ModelTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder,
};
use serde::Serialize;

use crate::errors::ApiError;
use crate::query::QueryKwargs;

/// Verbs served when a model does not choose its own.
pub const DEFAULT_ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::PUT, Method::DELETE];

/// A Sea-ORM entity exposed through the generated CRUD endpoints.
///
/// Every operation has a default implementation, so a plain entity only names
/// its types:
///
/// ```rust,ignore
/// impl ezi::CrudModel for person::Entity {
///     type Entity = person::Entity;
///     type Model = person::Model;
///     type ActiveModel = person::ActiveModel;
/// }
/// ```
///
/// Override `model_name` to change the URL segment, `allowed_methods` to
/// restrict the verbs, or `to_json` to control how a row is serialized.
#[async_trait]
pub trait CrudModel: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Serialize
        + Send
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;

    /// Lowercase name used in the URL and in error messages.
    #[must_use]
    fn model_name() -> String {
        Self::Entity::default().table_name().to_lowercase()
    }

    /// Verbs this model's view accepts; any other verb is answered with 400.
    #[must_use]
    fn allowed_methods() -> Vec<Method> {
        DEFAULT_ALLOWED_METHODS.to_vec()
    }

    /// Whether routes are generated for this model at all.
    #[must_use]
    fn exposed() -> bool {
        true
    }

    /// JSON representation of a row.
    ///
    /// # Errors
    ///
    /// Fails when the model cannot be represented as JSON.
    fn to_json(model: &Self::Model) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(model)
    }

    #[must_use]
    fn primary_key_column() -> Option<<Self::Entity as EntityTrait>::Column> {
        <Self::Entity as EntityTrait>::PrimaryKey::iter()
            .next()
            .map(PrimaryKeyToColumn::into_column)
    }

    /// Condition selecting the row with primary key `pk`.
    ///
    /// # Errors
    ///
    /// Fails when the entity declares no primary key.
    fn primary_key_condition(pk: i64) -> Result<Condition, ApiError> {
        let column = Self::primary_key_column().ok_or_else(|| {
            ApiError::internal(
                "Model has no primary key",
                Some(format!("{} declares no primary key column", Self::model_name())),
            )
        })?;
        Ok(Condition::all().add(column.eq(pk)))
    }

    /// Every row matching `kwargs`, ordered by primary key.
    async fn get_object_list(
        db: &DatabaseConnection,
        kwargs: &QueryKwargs,
    ) -> Result<Vec<Self::Model>, ApiError> {
        let condition = kwargs.to_condition::<Self::Entity>()?;
        let mut query = Self::Entity::find().filter(condition);
        if let Some(column) = Self::primary_key_column() {
            query = query.order_by_asc(column);
        }
        Ok(query.all(db).await?)
    }

    /// The row with primary key `pk`, provided it also matches `kwargs`.
    async fn get_object(
        db: &DatabaseConnection,
        pk: i64,
        kwargs: &QueryKwargs,
    ) -> Result<Self::Model, ApiError> {
        let condition = kwargs
            .to_condition::<Self::Entity>()?
            .add(Self::primary_key_condition(pk)?);

        Self::Entity::find()
            .filter(condition)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::model_name(), Some(pk.to_string())))
    }

    /// Inserts a row populated from `kwargs`; unnamed columns keep their defaults.
    async fn create_object(
        db: &DatabaseConnection,
        kwargs: &QueryKwargs,
    ) -> Result<Self::Model, ApiError> {
        let active_model = kwargs.to_active_model::<Self::ActiveModel>()?;
        let model = active_model.insert(db).await?;
        tracing::debug!(model = %Self::model_name(), "Created object");
        Ok(model)
    }

    /// Deletes the row with primary key `pk`.
    async fn delete_object(db: &DatabaseConnection, pk: i64) -> Result<(), ApiError> {
        let result = Self::Entity::delete_many()
            .filter(Self::primary_key_condition(pk)?)
            .exec(db)
            .await?;

        match result.rows_affected {
            0 => Err(ApiError::not_found(Self::model_name(), Some(pk.to_string()))),
            _ => Ok(()),
        }
    }

    /// Deletes every row matching `kwargs` and returns how many went.
    async fn delete_object_list(
        db: &DatabaseConnection,
        kwargs: &QueryKwargs,
    ) -> Result<u64, ApiError> {
        let condition = kwargs.to_condition::<Self::Entity>()?;
        let result = Self::Entity::delete_many()
            .filter(condition)
            .exec(db)
            .await?;

        tracing::debug!(
            model = %Self::model_name(),
            count = result.rows_affected,
            "Deleted object list"
        );
        Ok(result.rows_affected)
    }
}
