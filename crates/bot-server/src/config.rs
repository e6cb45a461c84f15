//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BIND_ADDR must be host:port, got '{0}'")]
    BindAddr(String),

    #[error("PORT must be a number between 1 and 65535, got '{0}'")]
    Port(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `BIND_ADDR` wins; otherwise listen on all interfaces at `PORT`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            let bind_addr = raw.trim().parse().map_err(|_| ConfigError::BindAddr(raw.clone()))?;
            return Ok(Self { bind_addr });
        }

        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::Port(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        })
    }
}
