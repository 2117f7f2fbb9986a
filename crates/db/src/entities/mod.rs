//! `SeaORM` entity definitions.

pub mod currencies;
pub mod groups;
pub mod user_approvers;
pub mod users;
