use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_roles::Roles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminUsers::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(AdminUsers::PasswordHash).string().not_null())
                    .col(ColumnDef::new(AdminUsers::RoleId).integer().null())
                    .col(ColumnDef::new(AdminUsers::CustomPermissions).string().null())
                    .col(ColumnDef::new(AdminUsers::VereinId).integer().null())
                    .col(
                        ColumnDef::new(AdminUsers::MustChangePassword)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(AdminUsers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(AdminUsers::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_users_role_id")
                            .from(AdminUsers::Table, AdminUsers::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_users_role_id")
                    .table(AdminUsers::Table)
                    .col(AdminUsers::RoleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Username,
    PasswordHash,
    RoleId,
    CustomPermissions,
    VereinId,
    MustChangePassword,
    CreatedAt,
    UpdatedAt,
}
