//! Backend store - SQLite persistence for families, members, and shopping lists

mod family_store;
mod models;

pub use family_store::{FAMILY_NOT_FOUND, FamilyStore, NO_MEMBERS_FOUND};
pub use models::{Family, FamilyMember, Gender, NewMember, ShoppingList};
