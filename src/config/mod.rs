mod server;

pub use server::{DatabaseConfig, ServerConfig};
