use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use clap::Parser;
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Default, Parser)]
#[command(name = "mc-status-backend")]
#[command(about = "Serves live Minecraft server status over HTTP")]
pub struct Cli {
    /// The http server port
    #[arg(long)]
    pub port: Option<u16>,

    /// The address to listen on
    #[arg(long)]
    pub addr: Option<IpAddr>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub addr: IpAddr,
    pub port: u16,
    pub ping_timeout_secs: u64,
    pub max_conns_per_ip: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8085,
            ping_timeout_secs: 5,
            max_conns_per_ip: 3,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{addr: {}, port: {}, pingTimeoutSecs: {}, maxConnsPerIp: {} }}",
            self.addr, self.port, self.ping_timeout_secs, self.max_conns_per_ip
        )
    }
}

impl Config {
    /// Defaults, then `$CONFIG_DIR/config.json`, then the environment, then command-line flags.
    pub fn load(cli: Cli) -> Result<Self, Error> {
        let mut config = match std::env::var_os("CONFIG_DIR") {
            Some(dir) => load_config(PathBuf::from(dir)).unwrap_or_else(|err| {
                tracing::warn!(
                    "Error loading configuration: {err}. Using default: {}",
                    Config::default()
                );
                Config::default()
            }),
            None => Config::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    fn apply_env<F>(&mut self, var: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("BACKEND_ADDR") {
            self.addr = addr.parse()?;
        }
        if let Some(port) = var("BACKEND_PORT") {
            self.port = port.parse()?;
        }
        if let Some(secs) = var("PING_TIMEOUT_SECS") {
            self.ping_timeout_secs = secs.parse()?;
        }
        if let Some(max) = var("MAX_CONNS_PER_IP") {
            self.max_conns_per_ip = max.parse()?;
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: Cli) {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(addr) = cli.addr {
            self.addr = addr;
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.ping_timeout_secs == 0 {
            return Err(Error::Generic("pingTimeoutSecs must be at least 1".to_owned()));
        }
        if self.max_conns_per_ip == 0 {
            return Err(Error::Generic("maxConnsPerIp must be at least 1".to_owned()));
        }
        Ok(())
    }
}

fn load_config(mut config_path: PathBuf) -> Result<Config, Error> {
    config_path.push("config.json");
    let config_string = std::fs::read_to_string(config_path)?;
    Ok(serde_json::from_str(&config_string)?)
}
