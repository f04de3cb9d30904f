// src/models/mod.rs

pub mod attempt;
pub mod question;
pub mod quiz;
pub mod session;
pub mod settings;
pub mod user;
