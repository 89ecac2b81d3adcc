pub mod audit;
pub mod errors;
pub mod user;

pub use audit::PostgresAuditRepository;
pub use user::PostgresUserRepository;
