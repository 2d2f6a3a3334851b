pub mod cache;
pub mod configuration;
pub mod database;
pub mod domain;
mod email_client;
mod routes;
mod server;
pub mod telemetry;
pub mod users;
pub mod verification;

pub use configuration::Config;
pub use email_client::EmailClient;
pub use server::Server;

pub type Database = sqlx::Postgres;
pub type DbPool = sqlx::PgPool;
