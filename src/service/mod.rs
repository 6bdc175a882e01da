pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod games;
pub mod participants;
pub mod players;
pub mod stats;
