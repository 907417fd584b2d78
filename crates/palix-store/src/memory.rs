use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::path::StorePath;
use crate::traits::{DirEntry, NodeKind, TreeStore};

#[derive(Clone, Debug)]
enum Node {
    Dir(BTreeMap<String, Node>),
    File(Vec<u8>),
}

impl Node {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Dir(_) => NodeKind::Directory,
            Self::File(_) => NodeKind::File,
        }
    }
}

type Children = BTreeMap<String, Node>;

/// In-memory tree store.
///
/// Intended for pipeline runs and tests. The whole tree sits behind a
/// `RwLock`; leaves are cloned on read and write.
pub struct InMemoryTreeStore {
    root: RwLock<Children>,
}

impl InMemoryTreeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            root: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of leaves in the whole tree.
    pub fn file_count(&self) -> usize {
        fn count(children: &Children) -> usize {
            children
                .values()
                .map(|node| match node {
                    Node::Dir(c) => count(c),
                    Node::File(_) => 1,
                })
                .sum()
        }
        count(&self.root.read().expect("lock poisoned"))
    }

    /// Total bytes across all leaves.
    pub fn total_bytes(&self) -> u64 {
        fn sum(children: &Children) -> u64 {
            children
                .values()
                .map(|node| match node {
                    Node::Dir(c) => sum(c),
                    Node::File(data) => data.len() as u64,
                })
                .sum()
        }
        sum(&self.root.read().expect("lock poisoned"))
    }

    /// Returns `true` if the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root.read().expect("lock poisoned").is_empty()
    }

    /// Remove every node.
    pub fn clear(&self) {
        self.root.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the directory at `path`, failing on a missing or leaf component.
fn dir_ref<'a>(root: &'a Children, path: &StorePath) -> StoreResult<&'a Children> {
    let mut current = root;
    for (i, segment) in path.segments().iter().enumerate() {
        match current.get(segment) {
            Some(Node::Dir(children)) => current = children,
            Some(Node::File(_)) => return Err(StoreError::NotADirectory(path.ancestor(i + 1))),
            None => return Err(StoreError::NotFound(path.ancestor(i + 1))),
        }
    }
    Ok(current)
}

fn dir_mut<'a>(root: &'a mut Children, path: &StorePath) -> StoreResult<&'a mut Children> {
    let mut current = root;
    for (i, segment) in path.segments().iter().enumerate() {
        match current.get_mut(segment) {
            Some(Node::Dir(children)) => current = children,
            Some(Node::File(_)) => return Err(StoreError::NotADirectory(path.ancestor(i + 1))),
            None => return Err(StoreError::NotFound(path.ancestor(i + 1))),
        }
    }
    Ok(current)
}

impl TreeStore for InMemoryTreeStore {
    fn node_kind(&self, path: &StorePath) -> StoreResult<Option<NodeKind>> {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(Some(NodeKind::Directory));
        };
        let root = self.root.read().expect("lock poisoned");
        match dir_ref(&root, &parent) {
            Ok(children) => Ok(children.get(name).map(Node::kind)),
            Err(StoreError::NotFound(_) | StoreError::NotADirectory(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn create_dir(&self, path: &StorePath) -> StoreResult<bool> {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(false);
        };
        let mut root = self.root.write().expect("lock poisoned");
        let children = dir_mut(&mut root, &parent)?;
        match children.get(name) {
            Some(Node::Dir(_)) => Ok(false),
            Some(Node::File(_)) => Err(StoreError::NotADirectory(path.clone())),
            None => {
                children.insert(name.to_string(), Node::Dir(BTreeMap::new()));
                Ok(true)
            }
        }
    }

    fn write_file(&self, path: &StorePath, data: &[u8]) -> StoreResult<()> {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(StoreError::IsADirectory(path.clone()));
        };
        let mut root = self.root.write().expect("lock poisoned");
        let children = dir_mut(&mut root, &parent)?;
        if let Some(Node::Dir(_)) = children.get(name) {
            return Err(StoreError::IsADirectory(path.clone()));
        }
        children.insert(name.to_string(), Node::File(data.to_vec()));
        Ok(())
    }

    fn read_file(&self, path: &StorePath) -> StoreResult<Option<Vec<u8>>> {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(StoreError::IsADirectory(path.clone()));
        };
        let root = self.root.read().expect("lock poisoned");
        let children = match dir_ref(&root, &parent) {
            Ok(children) => children,
            Err(StoreError::NotFound(_) | StoreError::NotADirectory(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        match children.get(name) {
            Some(Node::File(data)) => Ok(Some(data.clone())),
            Some(Node::Dir(_)) => Err(StoreError::IsADirectory(path.clone())),
            None => Ok(None),
        }
    }

    fn list_dir(&self, path: &StorePath) -> StoreResult<Vec<DirEntry>> {
        let root = self.root.read().expect("lock poisoned");
        let children = dir_ref(&root, path)?;
        Ok(children
            .iter()
            .map(|(name, node)| DirEntry {
                name: name.clone(),
                kind: node.kind(),
            })
            .collect())
    }
}

impl std::fmt::Debug for InMemoryTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTreeStore")
            .field("file_count", &self.file_count())
            .finish()
    }
}
