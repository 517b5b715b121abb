use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::Serialize;

/// A registered AWS account (IAM key pair + region) in the `aws_accounts`
/// table. The primary key is a client-supplied UUID string so the wizard can
/// upsert the same account across edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "aws_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i64,
    pub account_name: String,
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub is_validated: bool,
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

    #[sea_orm(has_many = "super::monitored_resource::Entity")]
    MonitoredResource,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::monitored_resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonitoredResource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when creating or updating an account.
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub id: String,
    pub account_name: String,
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub is_validated: bool,
}

impl Model {
    /// Inserts the account, or updates it in place when the id already
    /// belongs to this user.
    pub async fn upsert(db: &DbConn, user_id: i64, input: AccountInput) -> Result<Model, DbErr> {
        let existing = Entity::find_by_id(&input.id)
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await?;

        match existing {
            Some(current) => {
                let mut active: ActiveModel = current.into();
                active.account_name = Set(input.account_name);
                active.account_id = Set(input.account_id);
                active.access_key_id = Set(input.access_key_id);
                active.secret_access_key = Set(input.secret_access_key);
                active.region = Set(input.region);
                active.is_validated = Set(input.is_validated);
                active.update(db).await
            }
            None => {
                let account = ActiveModel {
                    id: Set(input.id),
                    user_id: Set(user_id),
                    account_name: Set(input.account_name),
                    account_id: Set(input.account_id),
                    access_key_id: Set(input.access_key_id),
                    secret_access_key: Set(input.secret_access_key),
                    region: Set(input.region),
                    is_validated: Set(input.is_validated),
                    created_at: Set(Utc::now()),
                };
                account.insert(db).await
            }
        }
    }

    pub async fn list_for_user(db: &DbConn, user_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .all(db)
            .await
    }

    /// Fetches one of the user's accounts by primary key.
    pub async fn find_for_user(
        db: &DbConn,
        user_id: i64,
        account_pk: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(account_pk)
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    /// Deletes the account if it belongs to the user. Monitored resources go
    /// with it via the cascade. Returns whether a row was deleted.
    pub async fn delete_for_user(db: &DbConn, user_id: i64, account_pk: &str) -> Result<bool, DbErr> {
        let res = Entity::delete_many()
            .filter(Column::Id.eq(account_pk))
            .filter(Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok(res.rows_affected > 0)
    }
}
