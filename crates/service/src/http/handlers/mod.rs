pub mod community;
pub mod hello;
pub mod not_found;
pub mod push;
pub mod transaction;

pub use not_found::not_found_handler;
