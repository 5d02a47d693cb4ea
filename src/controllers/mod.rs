// src/controllers/mod.rs

pub mod comments;
pub mod play;
