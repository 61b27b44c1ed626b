use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Recounts from post_likes so the counter cannot drift under concurrent toggles.
// The row lock on the post serialises togglers of the same post.
const CREATE_TOGGLE_POST_LIKE: &str = r#"
CREATE OR REPLACE FUNCTION toggle_post_like(target_post_id uuid, target_user_id text)
RETURNS TABLE (likes bigint, views bigint)
LANGUAGE plpgsql
AS $$
DECLARE
    removed integer;
BEGIN
    PERFORM 1 FROM posts p WHERE p.id = target_post_id FOR UPDATE;
    IF NOT FOUND THEN
        RETURN;
    END IF;

    DELETE FROM post_likes pl
    WHERE pl.post_id = target_post_id AND pl.user_id = target_user_id;
    GET DIAGNOSTICS removed = ROW_COUNT;

    IF removed = 0 THEN
        INSERT INTO post_likes (post_id, user_id, created_at)
        VALUES (target_post_id, target_user_id, now());
    END IF;

    UPDATE posts p
    SET likes = (SELECT count(*) FROM post_likes pl WHERE pl.post_id = target_post_id)
    WHERE p.id = target_post_id;

    RETURN QUERY
    SELECT p.likes, p.views FROM posts p WHERE p.id = target_post_id;
END;
$$;
"#;

const CREATE_TRACK_POST_VIEW: &str = r#"
CREATE OR REPLACE FUNCTION track_post_view(target_post_id uuid, viewer_user_id text)
RETURNS void
LANGUAGE sql
AS $$
    UPDATE posts SET views = views + 1 WHERE id = target_post_id;
$$;
"#;

const DROP_PROCEDURES: &str = "
DROP FUNCTION IF EXISTS toggle_post_like(uuid, text);
DROP FUNCTION IF EXISTS track_post_view(uuid, text);
";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::VenueId).uuid().not_null())
                    .col(ColumnDef::new(Posts::MediaType).text().not_null())
                    .col(ColumnDef::new(Posts::MediaUrl).text().not_null())
                    .col(ColumnDef::new(Posts::Caption).text())
                    .col(
                        ColumnDef::new(Posts::Likes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Posts::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Posts::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Posts::Table, Posts::VenueId)
                            .to(Venues::Table, Venues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Posts::Table)
                    .col(Posts::VenueId)
                    .col(Posts::ExpiresAt)
                    .name("idx_posts_venue_id_expires_at")
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostLikes::UserId).text().not_null())
                    .col(
                        ColumnDef::new(PostLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PostLikes::PostId)
                            .col(PostLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(CREATE_TOGGLE_POST_LIKE).await?;
        db.execute_unprepared(CREATE_TRACK_POST_VIEW).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DROP_PROCEDURES)
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Posts {
    Table,
    Id,
    VenueId,
    MediaType,
    MediaUrl,
    Caption,
    Likes,
    Views,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum PostLikes {
    Table,
    PostId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Venues {
    Table,
    Id,
}
