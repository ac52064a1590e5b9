//! Routes

pub mod chat_routes;
