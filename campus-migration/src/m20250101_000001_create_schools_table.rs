use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000001_create_schools_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schools::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schools::Name).string().not_null())
                    .col(ColumnDef::new(Schools::Address).string().not_null())
                    .col(ColumnDef::new(Schools::City).string().not_null())
                    .col(ColumnDef::new(Schools::State).string().not_null())
                    .col(ColumnDef::new(Schools::Contact).string_len(20).not_null())
                    .col(ColumnDef::new(Schools::Image).string().not_null())
                    .col(
                        ColumnDef::new(Schools::EmailId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Schools::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Schools::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // list/search按创建时间倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_schools_created_at")
                    .table(Schools::Table)
                    .col(Schools::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
    Name,
    Address,
    City,
    State,
    Contact,
    Image,
    EmailId,
    CreatedAt,
    UpdatedAt,
}
