pub mod accounts;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod linkcheck;
pub mod password;
pub mod scan;
pub mod sheets;
pub mod state;
pub mod telemetry;
