use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CREATE_TRACK_VENUE_VIEW: &str = r#"
CREATE OR REPLACE FUNCTION track_venue_view(target_venue_id uuid, viewer_user_id text)
RETURNS void
LANGUAGE sql
AS $$
    UPDATE venues SET views = views + 1 WHERE id = target_venue_id;
$$;
"#;

const DROP_TRACK_VENUE_VIEW: &str = "DROP FUNCTION IF EXISTS track_venue_view(uuid, text);";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Venues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Venues::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Venues::OwnerId).text().not_null())
                    .col(ColumnDef::new(Venues::Name).text().not_null())
                    .col(ColumnDef::new(Venues::Type).text().not_null())
                    .col(ColumnDef::new(Venues::City).text().not_null())
                    .col(ColumnDef::new(Venues::Area).text().not_null())
                    .col(ColumnDef::new(Venues::Address).text())
                    .col(ColumnDef::new(Venues::ContactPhone).text())
                    .col(
                        ColumnDef::new(Venues::Categories)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Venues::Images)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Venues::WorkingHours).json_binary())
                    .col(ColumnDef::new(Venues::Lat).double())
                    .col(ColumnDef::new(Venues::Lng).double())
                    .col(
                        ColumnDef::new(Venues::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Venues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Venues::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Venues::Table, Venues::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Venues::Table)
                    .col(Venues::OwnerId)
                    .name("idx_venues_owner_id")
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(CREATE_TRACK_VENUE_VIEW)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DROP_TRACK_VENUE_VIEW)
            .await?;
        manager
            .drop_table(Table::drop().table(Venues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Venues {
    Table,
    Id,
    OwnerId,
    Name,
    Type,
    City,
    Area,
    Address,
    ContactPhone,
    Categories,
    Images,
    WorkingHours,
    Lat,
    Lng,
    Views,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
