use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Roles::DisplayName).string().not_null())
                    .col(ColumnDef::new(Roles::Description).string())
                    .to_owned(),
            )
            .await?;

        // Seed roles. Default permission sets live in the application's static catalog.
        let seed = Query::insert()
            .into_table(Roles::Table)
            .columns([Roles::Id, Roles::Name, Roles::DisplayName, Roles::Description])
            .values_panic([
                1.into(),
                "super_admin".into(),
                "Super-Administrator".into(),
                "Full access to every area of the back-office".into(),
            ])
            .values_panic([
                2.into(),
                "admin".into(),
                "Administrator".into(),
                "Manages all content and can view admin accounts".into(),
            ])
            .values_panic([
                3.into(),
                "redakteur".into(),
                "Redakteur".into(),
                "Edits news, events and galleries".into(),
            ])
            .values_panic([
                4.into(),
                "vereinsverwalter".into(),
                "Vereinsverwalter".into(),
                "Maintains the news and events of a Verein".into(),
            ])
            .to_owned();

        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Roles {
    Table,
    Id,
    Name,
    DisplayName,
    Description,
}
