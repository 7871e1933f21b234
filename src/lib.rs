// Library exports for bugtrack
// The binary and the integration tests both drive the client through these modules

pub mod api;
pub mod auth;
pub mod bugs;
pub mod commands;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod validation;
