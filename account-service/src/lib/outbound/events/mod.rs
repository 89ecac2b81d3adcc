pub mod consumer;
pub mod messages;
pub mod producer;

pub use consumer::KafkaAuditConsumer;
pub use producer::KafkaAuditProducer;
