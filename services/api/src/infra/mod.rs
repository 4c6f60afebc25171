pub mod blob;
pub mod credentials;
pub mod db;
