pub mod query;
pub mod repository;
pub mod slug;
pub mod types;
pub mod validation;
