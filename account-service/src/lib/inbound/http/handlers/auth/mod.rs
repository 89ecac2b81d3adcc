pub mod login;
pub mod logout;
pub mod register;
pub mod rotate;

pub use login::login;
pub use logout::logout;
pub use register::register;
pub use rotate::rotate;
