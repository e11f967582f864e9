pub mod admin;
pub mod auth;
pub mod chatter;
pub mod clients;
pub mod config;
pub mod customers;
pub mod email;
pub mod files;
pub mod leads;
pub mod meetings;
pub mod notes;
pub mod security;
pub mod shared;
pub mod templates;
pub mod todos;
pub mod web_server;
pub mod webhooks;
