// Sentibot - emotion-aware chatbot
// Library exports

pub mod chat;
pub mod cli;
pub mod config;
pub mod emotion;
pub mod errors;
pub mod metrics;
pub mod providers;
pub mod responder;
pub mod server;
