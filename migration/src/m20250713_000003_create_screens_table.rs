use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Screens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Screens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Screens::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Screens::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Screens::Title).string().not_null())
                    // web, mobile, other
                    .col(
                        ColumnDef::new(Screens::Type)
                            .string_len(16)
                            .not_null()
                            .default("web"),
                    )
                    .col(ColumnDef::new(Screens::ImageUrl).string())
                    .col(ColumnDef::new(Screens::Purpose).text())
                    .col(ColumnDef::new(Screens::Actions).json().not_null())
                    .col(ColumnDef::new(Screens::Inputs).json().not_null())
                    .col(ColumnDef::new(Screens::StaticContent).json().not_null())
                    .col(ColumnDef::new(Screens::Navigations).json().not_null())
                    .col(ColumnDef::new(Screens::States).json().not_null())
                    .col(ColumnDef::new(Screens::Data).json().not_null())
                    .col(ColumnDef::new(Screens::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Screens::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_screens_project_id")
                            .from(Screens::Table, Screens::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_screens_category_id")
                            .from(Screens::Table, Screens::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_screens_project_id")
                    .table(Screens::Table)
                    .col(Screens::ProjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Screens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Screens {
    Table,
    Id,
    ProjectId,
    CategoryId,
    Title,
    Type,
    ImageUrl,
    Purpose,
    Actions,
    Inputs,
    StaticContent,
    Navigations,
    States,
    Data,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
}
