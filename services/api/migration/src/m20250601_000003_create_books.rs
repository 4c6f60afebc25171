use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Books::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Books::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Books::Slug).string_len(200).not_null())
                    .col(ColumnDef::new(Books::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Books::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Books::Description).text().not_null())
                    .col(ColumnDef::new(Books::Isbn).string_len(13).not_null())
                    .col(ColumnDef::new(Books::PublicationDate).date().not_null())
                    .col(ColumnDef::new(Books::Publisher).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Books::Language)
                            .string_len(2)
                            .not_null()
                            .default("vi"),
                    )
                    .col(
                        ColumnDef::new(Books::Pages)
                            .integer()
                            .not_null()
                            .check(Expr::col(Books::Pages).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Books::Price)
                            .decimal_len(10, 2)
                            .not_null()
                            .check(Expr::col(Books::Price).gt(0)),
                    )
                    .col(ColumnDef::new(Books::CoverImage).string().null())
                    .col(
                        ColumnDef::new(Books::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Books::StockQuantity)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Books::StockQuantity).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Books::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Books::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_author_id")
                            .from(Books::Table, Books::AuthorId)
                            .to(Authors::Table, Authors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_category_id")
                            .from(Books::Table, Books::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Books::Table)
                    .col(Books::Isbn)
                    .unique()
                    .name("uq_books_isbn")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Books::Table)
                    .col(Books::Slug)
                    .unique()
                    .name("uq_books_slug")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Books::Table)
                    .col(Books::AuthorId)
                    .name("idx_books_author_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Books::Table)
                    .col(Books::CategoryId)
                    .name("idx_books_category_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Books {
    Table,
    Id,
    Title,
    Slug,
    AuthorId,
    CategoryId,
    Description,
    Isbn,
    PublicationDate,
    Publisher,
    Language,
    Pages,
    Price,
    CoverImage,
    Status,
    StockQuantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Authors {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}
