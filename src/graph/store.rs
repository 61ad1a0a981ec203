use super::conversion::IntoGraph;
use super::definition::Graph;
use crate::error::StoreError;
use crate::ui::WorkflowDocument;
use chrono::Utc;
use std::sync::{PoisonError, RwLock};

/// A source of workflow graphs, keyed by workflow id.
///
/// Every `load` returns an independent snapshot: edits made to the store afterwards are
/// never observed by a run that is already using the graph.
pub trait GraphStore: Send + Sync {
    fn load(&self, workflow_id: &str) -> Result<Graph, StoreError>;

    /// Ids of every stored workflow, in storage order.
    fn ids(&self) -> Vec<String>;
}

/// An in-memory store of canvas documents.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    documents: RwLock<Vec<WorkflowDocument>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new document or replaces the one with the same id.
    ///
    /// New documents get both timestamps set; replacements keep their creation time and
    /// get a fresh update time. Returns the document as stored.
    pub fn save(&self, mut document: WorkflowDocument) -> WorkflowDocument {
        let now = Utc::now();
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => {
                document.created_at = existing.created_at.or(Some(now));
                document.updated_at = Some(now);
                *existing = document.clone();
            }
            None => {
                document.created_at = Some(now);
                document.updated_at = Some(now);
                documents.push(document.clone());
            }
        }
        document
    }

    pub fn get(&self, workflow_id: &str) -> Option<WorkflowDocument> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.id == workflow_id)
            .cloned()
    }

    /// Removes a document. Returns `false` if no document had that id.
    pub fn delete(&self, workflow_id: &str) -> bool {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        let before = documents.len();
        documents.retain(|d| d.id != workflow_id);
        documents.len() != before
    }

    pub fn list(&self) -> Vec<WorkflowDocument> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl GraphStore for MemoryGraphStore {
    fn load(&self, workflow_id: &str) -> Result<Graph, StoreError> {
        let document = self
            .get(workflow_id)
            .ok_or_else(|| StoreError::NotFound(workflow_id.to_string()))?;
        Ok(document.into_graph()?)
    }

    fn ids(&self) -> Vec<String> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.id.clone())
            .collect()
    }
}
