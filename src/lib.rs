pub mod db;
pub mod feeds;
pub mod models;
pub mod publish;
pub mod relay;
pub mod schema;
pub mod settings;
