pub mod models;
pub mod repository;

pub use models::{PublicUser, UserModel};
pub use repository::UserRepository;
