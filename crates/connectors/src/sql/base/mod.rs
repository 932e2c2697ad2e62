pub mod builder;
pub mod capabilities;
pub mod classify;
pub mod connection;
pub mod error;
pub mod projection;
pub mod recording;
pub mod statements;
