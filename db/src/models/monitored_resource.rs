use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::{Deserialize, Serialize};

/// A resource selected for monitoring under an AWS account, keyed uniquely
/// by (account, type, resource id). `is_enabled` gates whether the
/// aggregation orchestrator includes it in a poll cycle.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "monitored_resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub aws_account_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub resource_name: String,
    pub is_enabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::aws_account::Entity",
        from = "Column::AwsAccountId",
        to = "super::aws_account::Column::Id",
        on_delete = "Cascade"
    )]
    AwsAccount,
}

impl Related<super::aws_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AwsAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when saving a resource selection.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceInput {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub resource_id: String,
    #[serde(rename = "name")]
    pub resource_name: String,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Model {
    /// Replaces the account's full resource set (delete-then-insert, matching
    /// the save semantics of the settings wizard).
    pub async fn replace_for_account(
        db: &DbConn,
        aws_account_id: &str,
        resources: Vec<ResourceInput>,
    ) -> Result<(), DbErr> {
        Entity::delete_many()
            .filter(Column::AwsAccountId.eq(aws_account_id))
            .exec(db)
            .await?;

        for resource in resources {
            let row = ActiveModel {
                aws_account_id: Set(aws_account_id.to_owned()),
                resource_type: Set(resource.resource_type),
                resource_id: Set(resource.resource_id),
                resource_name: Set(resource.resource_name),
                is_enabled: Set(resource.is_enabled),
                ..Default::default()
            };
            row.insert(db).await?;
        }

        Ok(())
    }

    pub async fn list_for_account(db: &DbConn, aws_account_id: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AwsAccountId.eq(aws_account_id))
            .all(db)
            .await
    }

    /// Only the resources included in a poll cycle.
    pub async fn list_enabled_for_account(
        db: &DbConn,
        aws_account_id: &str,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::AwsAccountId.eq(aws_account_id))
            .filter(Column::IsEnabled.eq(true))
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::aws_account::{AccountInput, Model as AwsAccount};
    use crate::models::user::Model as User;
    use crate::test_utils::setup_test_db;

    async fn seed_account(db: &DbConn) -> String {
        let user = User::create(db, "ops", "ops@example.com", "pw123456", false)
            .await
            .unwrap();
        AwsAccount::upsert(
            db,
            user.id,
            AccountInput {
                id: "acc-1".into(),
                account_name: "Prod".into(),
                account_id: "123456789012".into(),
                access_key_id: "AKIA000".into(),
                secret_access_key: "secret".into(),
                region: "ap-southeast-1".into(),
                is_validated: true,
            },
        )
        .await
        .unwrap();
        "acc-1".into()
    }

    fn resource(kind: &str, id: &str, enabled: bool) -> ResourceInput {
        ResourceInput {
            resource_type: kind.into(),
            resource_id: id.into(),
            resource_name: format!("{kind}-{id}"),
            is_enabled: enabled,
        }
    }

    #[tokio::test]
    async fn replace_overwrites_previous_set() {
        let db = setup_test_db().await;
        let account = seed_account(&db).await;

        Model::replace_for_account(
            &db,
            &account,
            vec![resource("ec2", "i-1", true), resource("rds", "db-1", true)],
        )
        .await
        .unwrap();
        Model::replace_for_account(&db, &account, vec![resource("s3", "bucket-1", true)])
            .await
            .unwrap();

        let rows = Model::list_for_account(&db, &account).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource_type, "s3");
    }

    #[tokio::test]
    async fn enabled_filter_excludes_disabled() {
        let db = setup_test_db().await;
        let account = seed_account(&db).await;

        Model::replace_for_account(
            &db,
            &account,
            vec![resource("ec2", "i-1", true), resource("rds", "db-1", false)],
        )
        .await
        .unwrap();

        let enabled = Model::list_enabled_for_account(&db, &account).await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].resource_type, "ec2");
    }
}
