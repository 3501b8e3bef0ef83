pub mod client;
pub mod messages;
pub mod replies;

pub use client::BusUserDirectory;
pub use replies::DirectoryReplyConsumer;
