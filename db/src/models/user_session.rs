use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::Serialize;

/// Bearer session in the `user_sessions` table. Tokens are opaque random
/// strings with a fixed expiry (24 hours by default).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "user_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Issues a fresh session for the user, valid for `duration_hours`.
    pub async fn create(db: &DbConn, user_id: i64, duration_hours: i64) -> Result<Model, DbErr> {
        let now = Utc::now();
        let session = ActiveModel {
            user_id: Set(user_id),
            session_token: Set(Self::generate_token()),
            expires_at: Set(now + Duration::hours(duration_hours)),
            created_at: Set(now),
            ..Default::default()
        };

        session.insert(db).await
    }

    /// Resolves a bearer token to its user id, honoring expiry.
    pub async fn resolve_user_id(db: &DbConn, token: &str) -> Result<Option<i64>, DbErr> {
        let session = Entity::find()
            .filter(Column::SessionToken.eq(token))
            .filter(Column::ExpiresAt.gt(Utc::now()))
            .one(db)
            .await?;

        Ok(session.map(|s| s.user_id))
    }

    pub async fn is_valid(db: &DbConn, token: &str) -> Result<bool, DbErr> {
        Ok(Self::resolve_user_id(db, token).await?.is_some())
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
