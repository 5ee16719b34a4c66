use clap::Parser;
use std::sync::OnceLock;

/// Runtime configuration for the gateway process.
///
/// Every setting is resolvable from either a command-line flag or the named
/// environment variable, with the flag taking precedence. Configuration is
/// read once at startup and is immutable afterwards.
#[derive(Debug, Parser)]
#[command(name = "ldap-gateway", version, about = "HTTP gateway for LDAP directory search")]
pub struct Config {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "GATEWAY_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// Port the HTTP listener binds to.
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 3000)]
    pub port: u16,
    /// URL of the directory server, e.g. `ldap://localhost:389`.
    #[arg(long, env = "LDAP_URL", default_value = "ldap://127.0.0.1:389")]
    pub ldap_url: String,
    /// Identity used for the initial simple bind. Anonymous when absent.
    #[arg(long, env = "LDAP_BIND_DN")]
    pub bind_dn: Option<String>,
    /// Credential used for the initial simple bind.
    #[arg(long, env = "LDAP_BIND_PASSWORD", hide_env_values = true)]
    pub bind_password: Option<String>,
    /// Lower the default log filter to `debug`.
    #[arg(long, env = "GATEWAY_DEBUG")]
    pub debug: bool,
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Parse flags and environment and install the result in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    CONFIG.set(config).expect("Failed to set config");
}
