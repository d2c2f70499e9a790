use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 用户表：邮箱唯一（登录凭据），角色默认 user
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("user"))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. 角色只允许三种取值，与 UserRole 枚举保持一致
        let db = manager.get_connection();
        db.execute_unprepared(
            "ALTER TABLE users
             ADD CONSTRAINT users_role_check
             CHECK (role IN ('user', 'admin', 'moderator'));",
        )
        .await?;

        // 3. updated_at 由触发器维护
        db.execute_unprepared(
            "CREATE OR REPLACE FUNCTION touch_updated_at()
             RETURNS TRIGGER AS $$
             BEGIN
                 NEW.updated_at = NOW();
                 RETURN NEW;
             END;
             $$ language 'plpgsql';",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TRIGGER users_touch_updated_at
             BEFORE UPDATE ON users
             FOR EACH ROW
             EXECUTE PROCEDURE touch_updated_at();",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TRIGGER IF EXISTS users_touch_updated_at ON users;")
            .await?;
        db.execute_unprepared("DROP FUNCTION IF EXISTS touch_updated_at;")
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}
