//! Process-lifetime record of the workspaces this bot provisioned.
//!
//! Deletion prefers these ids over name scans. Workspaces created by an
//! earlier process are not here and are found by name instead.

use parking_lot::Mutex;
use rvbmo_sdk::types::RoleId;

use crate::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn generate() -> Self {
        let bytes: [u8; 8] = rand::random();
        WorkspaceId(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Default)]
pub struct WorkspaceRegistry {
    records: Mutex<Vec<(WorkspaceId, Workspace)>>,
}

impl WorkspaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, workspace: Workspace) -> WorkspaceId {
        let id = WorkspaceId::generate();
        tracing::debug!(id = %id, workspace = %workspace.name, "Registered workspace");
        self.records.lock().push((id.clone(), workspace));
        id
    }

    pub fn by_role(&self, role: RoleId) -> Option<(WorkspaceId, Workspace)> {
        self.records
            .lock()
            .iter()
            .find(|(_, w)| w.role == role)
            .cloned()
    }

    /// Oldest record with this exact name.
    pub fn by_name(&self, name: &str) -> Option<(WorkspaceId, Workspace)> {
        self.records
            .lock()
            .iter()
            .find(|(_, w)| w.name == name)
            .cloned()
    }

    pub fn remove(&self, id: &WorkspaceId) -> Option<Workspace> {
        let mut records = self.records.lock();
        let pos = records.iter().position(|(rid, _)| rid == id)?;
        Some(records.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
