//! Configuration for kvferry
//!
//! Centralized configuration with sensible defaults.

use crate::error::{MigrateError, Result};

/// Main configuration for a migration run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------
    /// URL of the store being read (`redis://host:port/db`)
    pub source_url: String,

    /// URL of the store being restored into
    pub target_url: String,

    /// Idle connections kept per pool
    pub pool_size: usize,

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------
    /// Suppress the per-key progress events
    pub quiet: bool,

    /// Carry each key's remaining TTL to the target
    pub sync_ttl: bool,

    /// Payloads buffered between reader and writer (0 = rendezvous)
    pub bus_capacity: usize,

    /// COUNT hint sent with every SCAN page
    pub scan_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: "redis://127.0.0.1:6379".to_string(),
            target_url: "redis://127.0.0.1:6380".to_string(),
            pool_size: 4,
            quiet: false,
            sync_ttl: false,
            bus_capacity: 100,
            scan_count: 10,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scan_count == 0 {
            return Err(MigrateError::Config("scan_count must be at least 1".into()));
        }
        if self.pool_size == 0 {
            return Err(MigrateError::Config("pool_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the source store URL
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.config.source_url = url.into();
        self
    }

    /// Set the target store URL
    pub fn target_url(mut self, url: impl Into<String>) -> Self {
        self.config.target_url = url.into();
        self
    }

    /// Set the number of idle connections kept per pool
    pub fn pool_size(mut self, size: usize) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Enable or disable quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.quiet = quiet;
        self
    }

    /// Enable or disable TTL sync
    pub fn sync_ttl(mut self, sync_ttl: bool) -> Self {
        self.config.sync_ttl = sync_ttl;
        self
    }

    /// Set the bus capacity (in payloads)
    pub fn bus_capacity(mut self, capacity: usize) -> Self {
        self.config.bus_capacity = capacity;
        self
    }

    /// Set the SCAN COUNT hint
    pub fn scan_count(mut self, count: usize) -> Self {
        self.config.scan_count = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
