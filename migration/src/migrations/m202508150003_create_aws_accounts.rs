use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202508150003_create_aws_accounts"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("aws_accounts"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).string().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("user_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("account_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("account_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("access_key_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("secret_access_key")).string().not_null())
                    .col(ColumnDef::new(Alias::new("region")).string().not_null())
                    .col(ColumnDef::new(Alias::new("is_validated")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_aws_accounts_user")
                            .from(Alias::new("aws_accounts"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("aws_accounts")).to_owned())
            .await
    }
}
