pub mod auth_service;
pub mod ticket_service;
pub mod token_service;
