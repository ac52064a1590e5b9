//! Request and response bodies

pub mod chat_dto;

pub use chat_dto::*;
