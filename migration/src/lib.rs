//! Database migrations using SeaORM

pub use sea_orm_migration::prelude::*;

mod m20260302_000001_create_profiles;
mod m20260302_000002_create_bonus_entries;
mod m20260302_000003_create_prizes;
mod m20260302_000004_create_redemptions;
mod m20260302_000005_create_registration_links;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260302_000001_create_profiles::Migration),
      Box::new(m20260302_000002_create_bonus_entries::Migration),
      Box::new(m20260302_000003_create_prizes::Migration),
      Box::new(m20260302_000004_create_redemptions::Migration),
      Box::new(m20260302_000005_create_registration_links::Migration),
    ]
  }
}
