//! Document storage for bootcamps.
//!
//! [`BootcampStore`] is the seam between the service and whatever holds the
//! documents. [`MemoryStore`] keeps them in process and can persist the whole
//! collection to a JSON file after every write.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{BootcampError, Result};
use crate::model::Bootcamp;
use crate::query::{Filter, FindQuery};

/// Collection operations used by the service.
///
/// Implementations enforce uniqueness of `name` and must apply each call
/// atomically with respect to other calls.
#[async_trait]
pub trait BootcampStore: Send + Sync {
    /// Insert a validated document.
    async fn create(&self, bootcamp: Bootcamp) -> Result<Bootcamp>;

    /// Insert several validated documents; all or nothing.
    async fn insert_many(&self, bootcamps: Vec<Bootcamp>) -> Result<usize>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>>;

    /// Filter, sort, then apply the skip/limit window.
    async fn find(&self, query: &FindQuery) -> Result<Vec<Bootcamp>>;

    /// Number of documents matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Merge `patch` into the document and re-validate. `None` if absent.
    async fn update(&self, id: &str, patch: &Map<String, Value>) -> Result<Option<Bootcamp>>;

    /// Remove and return the document. `None` if absent.
    async fn delete(&self, id: &str) -> Result<Option<Bootcamp>>;

    /// Remove every document, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;
}

/// In-process store, optionally backed by a JSON file.
///
/// Writes build the next version of the collection, persist it (when a path
/// is configured), and only then replace the in-memory state, so a failed
/// write leaves both the file and memory unchanged. Writers are serialized
/// on an async mutex and the file is written with `tokio::fs`; the document
/// lock is only held to copy or swap the collection, never across I/O.
///
/// # Example
///
/// ```ignore
/// use bootcamp::store::{BootcampStore, MemoryStore};
///
/// let store = MemoryStore::open("/data/bootcamps.json")?;
/// let total = store.count(&Default::default()).await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Bootcamp>>,
    writer: Mutex<()>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store persisted at `path`.
    ///
    /// A missing or empty file is an empty collection; the file is created on
    /// the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let documents = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            path = %path.display(),
            documents = documents.len(),
            "Opened bootcamp data file"
        );

        Ok(Self {
            documents: RwLock::new(documents),
            writer: Mutex::new(()),
            path: Some(path),
        })
    }

    async fn persist(&self, documents: &[Bootcamp]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_vec_pretty(documents)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Run `mutate` on a copy of the collection and commit it if it succeeds.
    async fn write<T>(&self, mutate: impl FnOnce(&mut Vec<Bootcamp>) -> Result<T>) -> Result<T> {
        let _writer = self.writer.lock().await;
        let mut next = self.read(|docs| Ok(docs.to_vec()))?;
        let out = mutate(&mut next)?;
        self.persist(&next).await?;
        *self.documents.write().map_err(|_| BootcampError::Poisoned)? = next;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&[Bootcamp]) -> Result<T>) -> Result<T> {
        let guard = self.documents.read().map_err(|_| BootcampError::Poisoned)?;
        f(&guard)
    }
}

fn ensure_unique_name(documents: &[Bootcamp], candidate: &Bootcamp) -> Result<()> {
    if documents
        .iter()
        .any(|b| b.id != candidate.id && b.name == candidate.name)
    {
        return Err(BootcampError::Duplicate {
            field: "name".to_string(),
            value: candidate.name.clone(),
        });
    }
    Ok(())
}

#[async_trait]
impl BootcampStore for MemoryStore {
    async fn create(&self, bootcamp: Bootcamp) -> Result<Bootcamp> {
        self.write(|docs| {
            ensure_unique_name(docs, &bootcamp)?;
            docs.push(bootcamp.clone());
            Ok(bootcamp)
        })
        .await
    }

    async fn insert_many(&self, bootcamps: Vec<Bootcamp>) -> Result<usize> {
        self.write(|docs| {
            let count = bootcamps.len();
            for bootcamp in bootcamps {
                ensure_unique_name(docs, &bootcamp)?;
                docs.push(bootcamp);
            }
            Ok(count)
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>> {
        self.read(|docs| Ok(docs.iter().find(|b| b.id == id).cloned()))
    }

    async fn find(&self, query: &FindQuery) -> Result<Vec<Bootcamp>> {
        self.read(|docs| {
            let mut matched: Vec<(Value, &Bootcamp)> = Vec::new();
            for bootcamp in docs {
                let document = bootcamp.to_document()?;
                if query.filter.matches(&document) {
                    matched.push((document, bootcamp));
                }
            }

            // Stable: ties keep insertion order.
            matched.sort_by(|(a, _), (b, _)| query.sort.compare(a, b));

            let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
            let take = query
                .limit
                .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
                .unwrap_or(usize::MAX);

            Ok(matched
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|(_, b)| b.clone())
                .collect())
        })
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        self.read(|docs| {
            if filter.is_empty() {
                return Ok(docs.len() as u64);
            }
            let mut count = 0;
            for bootcamp in docs {
                if filter.matches(&bootcamp.to_document()?) {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    async fn update(&self, id: &str, patch: &Map<String, Value>) -> Result<Option<Bootcamp>> {
        self.write(|docs| {
            let Some(idx) = docs.iter().position(|b| b.id == id) else {
                return Ok(None);
            };
            let updated = docs[idx].apply_patch(patch)?;
            ensure_unique_name(docs, &updated)?;
            docs[idx] = updated.clone();
            Ok(Some(updated))
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<Option<Bootcamp>> {
        // Avoid rewriting the data file when nothing changes.
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }
        self.write(|docs| {
            Ok(docs
                .iter()
                .position(|b| b.id == id)
                .map(|idx| docs.remove(idx)))
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64> {
        self.write(|docs| {
            let removed = docs.len() as u64;
            docs.clear();
            Ok(removed)
        })
        .await
    }
}
