// src/handlers/mod.rs

pub mod curriculum;
pub mod dashboard;
pub mod faculty;
pub mod health;
pub mod profile;
pub mod quiz;
