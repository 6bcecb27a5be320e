pub mod app;
pub mod database;
pub mod smtp;

pub use app::AppConfig;
pub use database::{run_migrations, DatabaseConfig};
pub use smtp::SmtpConfig;
