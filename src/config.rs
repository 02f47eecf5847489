use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};
use crate::pdf::PageSize;

pub const DEFAULT_PORT: u16 = 5004;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub page_size: PageSize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            page_size: PageSize::Letter,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?,
            None => DEFAULT_PORT,
        };
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let page_size = match lookup("PDF_PAGE_SIZE") {
            Some(value) => value.parse::<PageSize>()?,
            None => PageSize::Letter,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            page_size,
        })
    }
}
