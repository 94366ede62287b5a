//! Admin trait defining the interface to the table store

use async_trait::async_trait;
use gc_policy_core::PolicyNode;
use serde::{Deserialize, Serialize};

use crate::AdminError;

/// Column family as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyInfo {
    pub name: String,
    /// Rendered policy text, empty when nothing is collected
    pub gc_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub families: Vec<FamilyInfo>,
}

impl TableInfo {
    pub fn family(&self, name: &str) -> Option<&FamilyInfo> {
        self.families.iter().find(|f| f.name == name)
    }
}

/// Operations the GC policy resource needs from the table store
#[async_trait]
pub trait TableAdmin: Send + Sync {
    /// Replace the GC policy of a column family
    async fn set_gc_policy(
        &self,
        instance: &str,
        table: &str,
        family: &str,
        policy: &PolicyNode,
    ) -> Result<(), AdminError>;

    /// Describe a table and its column families
    async fn table_info(&self, instance: &str, table: &str) -> Result<TableInfo, AdminError>;
}
