use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    read_only: Arc<Mutex<HashSet<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, content: &str) -> Self {
        let mut files = HashMap::new();
        files.insert(path.to_string(), content.as_bytes().to_vec());
        Self {
            files: Arc::new(Mutex::new(files)),
            read_only: Arc::default(),
        }
    }

    pub async fn put_text(&self, path: &str, content: &str) {
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), content.as_bytes().to_vec());
    }

    pub async fn get_text(&self, path: &str) -> Option<String> {
        let files = self.files.lock().await;
        files
            .get(path)
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }

    pub async fn deny_writes_to(&self, path: &str) {
        self.read_only.lock().await.insert(path.to_string());
    }
}

impl Storage for MockStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let files = self.files.lock().await;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| EtlError::source_unavailable(path, "File not found"))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        if self.read_only.lock().await.contains(path) {
            return Err(EtlError::destination_unwritable(path, "Permission denied"));
        }
        let mut files = self.files.lock().await;
        files.insert(path.to_string(), data.to_vec());
        Ok(())
    }
}
