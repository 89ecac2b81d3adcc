pub mod revocation;

pub use revocation::connect;
pub use revocation::RedisRevocationCache;
