pub mod extract;
pub mod handlers;
pub mod http_api;
