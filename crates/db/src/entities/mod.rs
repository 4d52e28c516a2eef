//! `SeaORM` entities for the ledger tables.

pub mod accounts;
pub mod sea_orm_active_enums;
pub mod transactions;

pub mod prelude {
    //! Entity re-exports.
    pub use super::accounts::Entity as Accounts;
    pub use super::transactions::Entity as Transactions;
}
