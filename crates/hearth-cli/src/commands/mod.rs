pub mod budget;
pub mod chat;
pub mod client;
pub mod config;
pub mod household;
pub mod profile;
pub mod tools;
