pub mod ask;
pub mod chat;
pub mod ping;
pub mod topics;
