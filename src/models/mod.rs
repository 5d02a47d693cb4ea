// src/models/mod.rs

pub mod attempt;
pub mod comment;
pub mod quiz;
pub mod stats;
pub mod user;
