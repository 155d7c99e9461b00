pub mod password;
mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::User;
pub use services::{authenticate, lookup_user};
