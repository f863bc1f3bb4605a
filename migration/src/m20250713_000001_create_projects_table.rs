use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::LogoUrl).string())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::StartTime).timestamp())
                    .col(ColumnDef::new(Projects::EndTime).timestamp())
                    .col(ColumnDef::new(Projects::Price).double())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Projects::FigmaUrl).string())
                    .col(ColumnDef::new(Projects::DocsUrl).string())
                    .col(ColumnDef::new(Projects::LiveUrl).string())
                    .col(ColumnDef::new(Projects::OtherUrl).string())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    LogoUrl,
    Description,
    StartTime,
    EndTime,
    Price,
    Status,
    FigmaUrl,
    DocsUrl,
    LiveUrl,
    OtherUrl,
    CreatedAt,
    UpdatedAt,
}
