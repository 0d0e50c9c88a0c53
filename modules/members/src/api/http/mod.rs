pub mod dto;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod session;
