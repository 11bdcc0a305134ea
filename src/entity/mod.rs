//! SeaORM entity definitions for the loyalty CRM tables.

pub mod bonus_entry;
pub mod prize;
pub mod profile;
pub mod redemption;
pub mod registration_link;
