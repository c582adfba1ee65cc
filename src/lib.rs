//! Homework tutor: send a photo of a problem to a generative model and get
//! back a step-by-step explanation with furigana, then ask follow-ups.

pub mod auth;
pub mod banner;
pub mod client;
pub mod commands;
pub mod config;
pub mod consts;
pub mod conversation;
pub mod extract;
pub mod generator;
pub mod image;
pub mod prompts;
pub mod server;
pub mod solver;
pub mod spinner;
