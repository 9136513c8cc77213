// src/services/mod.rs
pub mod azure_openai;
pub mod chatbot;
