use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Profiles::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Profiles::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Profiles::Email)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Profiles::Name).string().not_null())
          .col(ColumnDef::new(Profiles::Phone).string())
          .col(ColumnDef::new(Profiles::Role).string().not_null())
          .col(
            ColumnDef::new(Profiles::TotalPoints)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Profiles::IsVerified)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Profiles::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Profiles {
  Table,
  Id,
  Email,
  Name,
  Phone,
  Role,
  TotalPoints,
  IsVerified,
  CreatedAt,
}
