pub mod auth;
pub mod chatbots;
pub mod env;
