use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpCodes::PhoneNumber).text().not_null())
                    .col(ColumnDef::new(OtpCodes::Code).text().not_null())
                    .col(
                        ColumnDef::new(OtpCodes::Purpose)
                            .text()
                            .not_null()
                            .default("login"),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpCodes::ExpiresAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Serves the (phone_number, code) lookup ordered by newest first.
        manager
            .create_index(
                Index::create()
                    .table(OtpCodes::Table)
                    .col(OtpCodes::PhoneNumber)
                    .col(OtpCodes::Code)
                    .col(OtpCodes::CreatedAt)
                    .name("idx_otp_codes_phone_code_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpCodes {
    Table,
    Id,
    PhoneNumber,
    Code,
    Purpose,
    Attempts,
    CreatedAt,
    ExpiresAt,
}
