pub mod get_user;
pub mod list_users;
pub mod prune_user;
pub mod remove_user;
pub mod restore_user;
pub mod trashed_users;
pub mod update_user;

pub use get_user::get_user;
pub use list_users::list_users;
pub use prune_user::prune_user;
pub use remove_user::remove_user;
pub use restore_user::restore_user;
pub use trashed_users::trashed_users;
pub use update_user::update_user;
