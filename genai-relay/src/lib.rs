//! genai-relay: relays prompts and model listings to a generative-language API.

pub mod config;
pub mod cors;
pub mod function;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
