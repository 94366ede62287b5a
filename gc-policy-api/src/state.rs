//! Application state shared across handlers

use gc_policy_admin::{AdminError, InMemoryAdmin, TableAdmin};
use std::sync::Arc;

use crate::config::TableSeed;

/// Shared application state
pub struct AppState {
    pub admin: Arc<dyn TableAdmin>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_admin(Arc::new(InMemoryAdmin::new()))
    }

    /// Create with a custom admin backend
    pub fn with_admin(admin: Arc<dyn TableAdmin>) -> Self {
        Self { admin }
    }

    /// In-memory admin pre-populated with the given tables
    pub fn seeded(tables: &[TableSeed]) -> Result<Self, AdminError> {
        let admin = InMemoryAdmin::new();
        for seed in tables {
            admin.create_table(&seed.instance, &seed.table, seed.column_families.iter().cloned())?;
            tracing::info!(
                "Seeded table {}/{} with {} column families",
                seed.instance,
                seed.table,
                seed.column_families.len()
            );
        }
        Ok(Self::with_admin(Arc::new(admin)))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
