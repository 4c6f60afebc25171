//! Access-token plumbing for the bookstore API.
//!
//! Provides JWT issuing and validation, cookie builders, and the `CurrentActor` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
