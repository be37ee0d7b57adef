//! Command-line argument parsing for metacat.
//!
//! CLI flags override the corresponding environment settings; everything else
//! comes from the environment.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Settings;

/// Business metadata service for warehouse data catalogs.
#[derive(Parser, Debug)]
#[command(name = "metacat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// HTTP listen port (overrides PORT)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// HTTP bind address (overrides BIND_ADDR)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Default warehouse catalog (overrides WAREHOUSE_CATALOG)
    #[arg(long, value_name = "CATALOG")]
    pub catalog: Option<String>,

    /// Default warehouse schema (overrides WAREHOUSE_SCHEMA)
    #[arg(long, value_name = "SCHEMA")]
    pub schema: Option<String>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Applies CLI overrides onto settings loaded from the environment.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(bind) = &self.bind {
            settings.bind = bind.clone();
        }
        if let Some(catalog) = &self.catalog {
            settings.catalog = catalog.clone();
        }
        if let Some(schema) = &self.schema {
            settings.schema = schema.clone();
        }
    }
}
