use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, QueryFilter};
use serde::Serialize;

/// Represents a dashboard user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// User's unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the user has admin privileges.
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_session::Entity")]
    UserSession,

    #[sea_orm(has_many = "super::aws_account::Entity")]
    AwsAccount,
}

impl Related<super::user_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSession.def()
    }
}

impl Related<super::aws_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AwsAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Creates a user with an argon2-hashed password.
    pub async fn create(
        db: &DbConn,
        username: &str,
        email: &str,
        password: &str,
        admin: bool,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let user = ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(Self::hash_password(password)),
            admin: Set(admin),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(db).await
    }

    pub async fn find_by_username(db: &DbConn, username: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Email.eq(email)).one(db).await
    }

    /// Looks up the user by username and checks the password.
    /// Returns `None` on unknown user or wrong password.
    pub async fn verify_credentials(
        db: &DbConn,
        username: &str,
        password: &str,
    ) -> Result<Option<Model>, DbErr> {
        let Some(user) = Self::find_by_username(db, username).await? else {
            return Ok(None);
        };

        if user.verify_password(password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Replaces the password for the user matching `email`.
    /// Returns whether a user was updated.
    pub async fn reset_password(db: &DbConn, email: &str, new_password: &str) -> Result<bool, DbErr> {
        let Some(user) = Self::find_by_email(db, email).await? else {
            return Ok(false);
        };

        let mut active: ActiveModel = user.into();
        active.password_hash = Set(Self::hash_password(new_password));
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(true)
    }

    pub fn hash_password(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("Failed to hash password")
            .to_string()
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn create_and_verify_credentials() {
        let db = setup_test_db().await;
        let user = Model::create(&db, "ops", "ops@example.com", "hunter22", false)
            .await
            .unwrap();
        assert_ne!(user.password_hash, "hunter22");

        let found = Model::verify_credentials(&db, "ops", "hunter22")
            .await
            .unwrap();
        assert!(found.is_some());

        let wrong = Model::verify_credentials(&db, "ops", "hunter23")
            .await
            .unwrap();
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn reset_password_rehashes() {
        let db = setup_test_db().await;
        Model::create(&db, "ops", "ops@example.com", "oldpass", false)
            .await
            .unwrap();

        assert!(Model::reset_password(&db, "ops@example.com", "newpass")
            .await
            .unwrap());
        assert!(!Model::reset_password(&db, "nobody@example.com", "x")
            .await
            .unwrap());

        let user = Model::verify_credentials(&db, "ops", "newpass")
            .await
            .unwrap();
        assert!(user.is_some());
    }
}
