use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202508150001_create_users::Migration),
            Box::new(migrations::m202508150002_create_user_sessions::Migration),
            Box::new(migrations::m202508150003_create_aws_accounts::Migration),
            Box::new(migrations::m202508150004_create_monitored_resources::Migration),
        ]
    }
}
