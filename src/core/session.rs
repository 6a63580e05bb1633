//! Persisted login session
//!
//! Records which team member is currently logged in so `visit new` can stamp
//! the logging user. One session per workspace.

use serde::{Deserialize, Serialize};
use std::fs;

use crate::core::identity::EntityId;
use crate::core::workspace::Workspace;
use crate::entities::user::Role;

/// The currently logged-in user, stored at .fieldtrack/session.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    /// Load the current session, if any
    pub fn load(workspace: &Workspace) -> Option<Self> {
        let path = workspace.session_path();
        let content = fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    /// Persist this session
    pub fn save(&self, workspace: &Workspace) -> std::io::Result<()> {
        let content = serde_yml::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(workspace.session_path(), content)
    }

    /// Remove any persisted session
    pub fn clear(workspace: &Workspace) -> std::io::Result<()> {
        let path = workspace.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use tempfile::tempdir;

    #[test]
    fn test_session_save_load_clear() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(Session::load(&ws).is_none());

        let session = Session {
            user_id: EntityId::new(EntityPrefix::User),
            name: "Demo Administrator".to_string(),
            email: "admin@demo.com".to_string(),
            role: Role::Admin,
        };
        session.save(&ws).unwrap();

        let loaded = Session::load(&ws).unwrap();
        assert_eq!(loaded.email, "admin@demo.com");
        assert_eq!(loaded.role, Role::Admin);

        Session::clear(&ws).unwrap();
        assert!(Session::load(&ws).is_none());
    }
}
