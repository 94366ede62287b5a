//! Server configuration loaded from the environment

use anyhow::{bail, Context, Result};

/// A table to create in the in-memory admin at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSeed {
    pub instance: String,
    pub table: String,
    pub column_families: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub tables: Vec<TableSeed>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid u16")?;
        let log_filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,gc_policy=debug".into());
        let tables = match std::env::var("GC_POLICY_TABLES") {
            Ok(spec) => parse_table_seeds(&spec).context("invalid GC_POLICY_TABLES")?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            host,
            port,
            log_filter,
            tables,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse `instance/table=cf1,cf2;instance/other=cf` into table seeds.
pub fn parse_table_seeds(spec: &str) -> Result<Vec<TableSeed>> {
    let mut seeds = Vec::new();
    for entry in spec.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((path, families)) = entry.split_once('=') else {
            bail!("missing '=' in table entry '{}'", entry);
        };
        let Some((instance, table)) = path.trim().split_once('/') else {
            bail!("expected instance/table in '{}'", path);
        };
        let column_families: Vec<String> = families
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect();
        if instance.is_empty() || table.is_empty() || column_families.is_empty() {
            bail!("incomplete table entry '{}'", entry);
        }

        seeds.push(TableSeed {
            instance: instance.to_string(),
            table: table.to_string(),
            column_families,
        });
    }
    Ok(seeds)
}
