pub mod authors;
pub mod books;
pub mod categories;
pub mod reviews;
pub mod users;
