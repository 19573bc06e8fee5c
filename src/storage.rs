use crate::constants::{CONFIG_DIR_NAME, CONNECTIONS_FILE};
use crate::models::{Connection, NewConnection};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Saved connections plus the active-connection pointer
pub trait ConnectionStore: Send {
    fn list(&self) -> Vec<Connection>;

    /// Stores a new connection under a fresh id and makes it active
    fn add(&mut self, connection: NewConnection) -> Result<Connection>;

    /// Full replace of an existing connection
    fn replace(&mut self, connection: Connection) -> Result<()>;

    /// Removes a connection; if it was active, the first remaining one becomes active
    fn delete(&mut self, id: &str) -> Result<()>;

    fn active_id(&self) -> Option<String>;

    fn set_active(&mut self, id: Option<String>) -> Result<()>;

    /// Active connection; a dangling id reads as none
    fn active(&self) -> Option<Connection> {
        let id = self.active_id()?;
        self.list().into_iter().find(|c| c.id == id)
    }

    fn get(&self, id: &str) -> Option<Connection> {
        self.list().into_iter().find(|c| c.id == id)
    }
}

/// Document shape shared by both stores
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionsDoc {
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    active_connection_id: Option<String>,
}

impl ConnectionsDoc {
    fn add(&mut self, connection: NewConnection) -> Connection {
        let connection = connection.into_connection(uuid::Uuid::new_v4().to_string());
        self.connections.push(connection.clone());
        self.active_connection_id = Some(connection.id.clone());
        connection
    }

    fn replace(&mut self, connection: Connection) -> Result<()> {
        let slot = self
            .connections
            .iter_mut()
            .find(|c| c.id == connection.id)
            .ok_or_else(|| anyhow!("Connection not found: {}", connection.id))?;
        *slot = connection;
        Ok(())
    }

    fn delete(&mut self, id: &str) {
        self.connections.retain(|c| c.id != id);
        if self.active_connection_id.as_deref() == Some(id) {
            self.active_connection_id = self.connections.first().map(|c| c.id.clone());
        }
    }

    fn set_active(&mut self, id: Option<String>) -> Result<()> {
        if let Some(id) = &id {
            if !self.connections.iter().any(|c| &c.id == id) {
                return Err(anyhow!("Connection not found: {}", id));
            }
        }
        self.active_connection_id = id;
        Ok(())
    }
}

/// In-memory store, lives as long as the process
#[derive(Default)]
pub struct MemoryConnectionStore {
    doc: ConnectionsDoc,
}

impl MemoryConnectionStore {
    pub fn new(connections: Vec<Connection>) -> Self {
        MemoryConnectionStore {
            doc: ConnectionsDoc {
                connections,
                active_connection_id: None,
            },
        }
    }
}

impl ConnectionStore for MemoryConnectionStore {
    fn list(&self) -> Vec<Connection> {
        self.doc.connections.clone()
    }

    fn add(&mut self, connection: NewConnection) -> Result<Connection> {
        Ok(self.doc.add(connection))
    }

    fn replace(&mut self, connection: Connection) -> Result<()> {
        self.doc.replace(connection)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.doc.delete(id);
        Ok(())
    }

    fn active_id(&self) -> Option<String> {
        self.doc.active_connection_id.clone()
    }

    fn set_active(&mut self, id: Option<String>) -> Result<()> {
        self.doc.set_active(id)
    }
}

/// YAML-file store under the config directory
pub struct FileConnectionStore {
    doc: ConnectionsDoc,
    path: PathBuf,
}

impl FileConnectionStore {
    /// Opens `~/.api-explorer/connections.yaml`
    pub fn open_default() -> Self {
        Self::open(default_config_dir().join(CONNECTIONS_FILE))
    }

    /// Loads `path`; a missing or corrupt file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match load_doc(&path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load saved connections");
                ConnectionsDoc::default()
            }
        };
        FileConnectionStore { doc, path }
    }

    fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_yaml::to_string(&self.doc)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn load_doc(path: &Path) -> Result<ConnectionsDoc> {
    if !path.exists() {
        return Ok(ConnectionsDoc::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

impl ConnectionStore for FileConnectionStore {
    fn list(&self) -> Vec<Connection> {
        self.doc.connections.clone()
    }

    fn add(&mut self, connection: NewConnection) -> Result<Connection> {
        let connection = self.doc.add(connection);
        self.save()?;
        Ok(connection)
    }

    fn replace(&mut self, connection: Connection) -> Result<()> {
        self.doc.replace(connection)?;
        self.save()
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.doc.delete(id);
        self.save()
    }

    fn active_id(&self) -> Option<String> {
        self.doc.active_connection_id.clone()
    }

    fn set_active(&mut self, id: Option<String>) -> Result<()> {
        self.doc.set_active(id)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiType, Auth};
    use tempfile::tempdir;

    #[test]
    fn test_add_sets_active() {
        let mut store = MemoryConnectionStore::default();
        let a = store.add(NewConnection::new("a", "https://a.example")).unwrap();
        let b = store.add(NewConnection::new("b", "https://b.example")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.active().unwrap().id, b.id);
    }

    #[test]
    fn test_delete_active_selects_first_remaining() {
        let mut store = MemoryConnectionStore::default();
        let a = store.add(NewConnection::new("a", "https://a.example")).unwrap();
        let b = store.add(NewConnection::new("b", "https://b.example")).unwrap();

        store.delete(&b.id).unwrap();
        assert_eq!(store.active_id(), Some(a.id.clone()));

        store.delete(&a.id).unwrap();
        assert_eq!(store.active_id(), None);
        assert!(store.active().is_none());
    }

    #[test]
    fn test_delete_inactive_keeps_pointer() {
        let mut store = MemoryConnectionStore::default();
        let a = store.add(NewConnection::new("a", "https://a.example")).unwrap();
        let b = store.add(NewConnection::new("b", "https://b.example")).unwrap();

        store.delete(&a.id).unwrap();
        assert_eq!(store.active_id(), Some(b.id));
    }

    #[test]
    fn test_replace_and_unknown_ids() {
        let mut store = MemoryConnectionStore::default();
        let mut a = store.add(NewConnection::new("a", "https://a.example")).unwrap();
        a.auth = Auth::Bearer { token: "t".into() };
        store.replace(a.clone()).unwrap();
        assert_eq!(store.get(&a.id).unwrap().auth, a.auth);

        assert!(store.set_active(Some("missing".into())).is_err());
        let ghost = NewConnection::new("x", "https://x.example").into_connection("ghost");
        assert!(store.replace(ghost).is_err());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONNECTIONS_FILE);

        let id = {
            let mut store = FileConnectionStore::open(&path);
            let conn = NewConnection::new("shop", "https://shop.example/wp-json")
                .with_api_type(ApiType::WordPress)
                .with_auth(Auth::WooCommerce {
                    consumer_key: "ck".into(),
                    consumer_secret: "cs".into(),
                });
            store.add(conn).unwrap().id
        };

        let store = FileConnectionStore::open(&path);
        let active = store.active().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.api_type, ApiType::WordPress);
        assert!(matches!(active.auth, Auth::WooCommerce { .. }));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONNECTIONS_FILE);
        std::fs::write(&path, "connections: [[[").unwrap();

        let store = FileConnectionStore::open(&path);
        assert!(store.list().is_empty());
    }
}
