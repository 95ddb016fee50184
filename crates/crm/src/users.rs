use entity::user;
use platform_api::{ApiError, ApiResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    auth::{Actor, UserRole},
    ownership::USER_NOT_FOUND,
};

/// Resolves a session subject into an actor; inactive or unknown users get none.
pub async fn load_actor(db: &DatabaseConnection, user_id: Uuid) -> ApiResult<Option<Actor>> {
    let found = user::Entity::find_by_id(user_id).one(db).await?;
    Ok(found
        .filter(|model| model.is_active)
        .map(|model| Actor::from_user(&model)))
}

pub async fn current_user(db: &DatabaseConnection, actor: &Actor) -> ApiResult<user::Model> {
    user::Entity::find_by_id(actor.user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> ApiResult<user::Model> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

pub async fn list_users(db: &DatabaseConnection, actor: &Actor) -> ApiResult<Vec<user::Model>> {
    actor.require(UserRole::Admin)?;
    Ok(user::Entity::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?)
}
