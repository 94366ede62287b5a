//! In-memory admin implementation for development and testing

use async_trait::async_trait;
use gc_policy_core::PolicyNode;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::{AdminError, FamilyInfo, TableAdmin, TableInfo};

type TableKey = (String, String);

/// In-memory table store keyed by (instance, table)
#[derive(Debug)]
pub struct InMemoryAdmin {
    tables: RwLock<HashMap<TableKey, BTreeMap<String, PolicyNode>>>,
}

impl InMemoryAdmin {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Create a table whose column families start without a GC policy
    pub fn create_table<I, S>(&self, instance: &str, table: &str, families: I) -> Result<(), AdminError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tables = self.tables.write();
        let key = (instance.to_string(), table.to_string());
        if tables.contains_key(&key) {
            return Err(AdminError::AlreadyExists(format!(
                "Table {} in instance {} already exists",
                table, instance
            )));
        }

        let families = families
            .into_iter()
            .map(|name| (name.into(), PolicyNode::NoPolicy))
            .collect();
        tables.insert(key, families);
        tracing::debug!("Created table {} in instance {}", table, instance);
        Ok(())
    }

    /// Current policy tree of a column family, if the family exists
    pub fn policy(&self, instance: &str, table: &str, family: &str) -> Option<PolicyNode> {
        let tables = self.tables.read();
        tables
            .get(&(instance.to_string(), table.to_string()))
            .and_then(|families| families.get(family))
            .cloned()
    }
}

impl Default for InMemoryAdmin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableAdmin for InMemoryAdmin {
    async fn set_gc_policy(
        &self,
        instance: &str,
        table: &str,
        family: &str,
        policy: &PolicyNode,
    ) -> Result<(), AdminError> {
        let mut tables = self.tables.write();
        let families = tables
            .get_mut(&(instance.to_string(), table.to_string()))
            .ok_or_else(|| {
                AdminError::NotFound(format!("Table {} not found in instance {}", table, instance))
            })?;
        let slot = families.get_mut(family).ok_or_else(|| {
            AdminError::NotFound(format!("Column family {} not found in table {}", family, table))
        })?;

        *slot = policy.clone();
        tracing::debug!("Set GC policy of {}/{}/{} to '{}'", instance, table, family, policy);
        Ok(())
    }

    async fn table_info(&self, instance: &str, table: &str) -> Result<TableInfo, AdminError> {
        let tables = self.tables.read();
        let families = tables
            .get(&(instance.to_string(), table.to_string()))
            .ok_or_else(|| {
                AdminError::NotFound(format!("Table {} not found in instance {}", table, instance))
            })?;

        Ok(TableInfo {
            name: table.to_string(),
            families: families
                .iter()
                .map(|(name, policy)| FamilyInfo {
                    name: name.clone(),
                    gc_policy: policy.to_string(),
                })
                .collect(),
        })
    }
}
