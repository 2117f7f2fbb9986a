//! Repository abstractions for data access.

pub mod currency;
pub mod group;
pub mod user;

pub use currency::CurrencyRepository;
pub use group::GroupRepository;
pub use user::UserRepository;
