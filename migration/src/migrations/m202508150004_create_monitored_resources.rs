use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202508150004_create_monitored_resources"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("monitored_resources"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("aws_account_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("resource_type")).string().not_null())
                    .col(ColumnDef::new(Alias::new("resource_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("resource_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("is_enabled")).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monitored_resources_account")
                            .from(Alias::new("monitored_resources"), Alias::new("aws_account_id"))
                            .to(Alias::new("aws_accounts"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_monitored_resources_account_type_resource")
                    .table(Alias::new("monitored_resources"))
                    .col(Alias::new("aws_account_id"))
                    .col(Alias::new("resource_type"))
                    .col(Alias::new("resource_id"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("monitored_resources")).to_owned())
            .await
    }
}
