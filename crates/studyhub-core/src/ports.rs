//! Service ports for the AI backends and the document library

use crate::error::{Result, TreeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use studyhub_types::{DocumentSummary, GenerationRequest};
use tracing::debug;
use uuid::Uuid;

/// Language model backend
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Free-form answer for a chat turn
    async fn complete(&self, request: &GenerationRequest) -> Result<String>;

    /// Raw quiz output, expected to be a JSON array of generated questions
    async fn generate_quiz(&self, request: &GenerationRequest) -> Result<String>;
}

/// Uploaded study documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn add_document(&self, filename: &str, text: &str) -> Result<DocumentSummary>;
    async fn get_chunks(&self, id: &str) -> Result<Vec<String>>;
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>>;
    async fn delete_document(&self, id: &str) -> Result<()>;
}

struct StoredDocument {
    filename: String,
    chunks: Vec<String>,
    created_at: DateTime<Utc>,
}

impl StoredDocument {
    fn summary(&self, id: &str) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            filename: self.filename.clone(),
            chunk_count: self.chunks.len(),
            created_at: self.created_at,
        }
    }
}

/// Split on blank lines, dropping empty paragraphs
pub fn chunk_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Document store kept in process memory
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<String, StoredDocument>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add_document(&self, filename: &str, text: &str) -> Result<DocumentSummary> {
        let id = Uuid::new_v4().to_string();
        let document = StoredDocument {
            filename: filename.to_string(),
            chunks: chunk_paragraphs(text),
            created_at: Utc::now(),
        };
        let summary = document.summary(&id);
        debug!("Stored document {} ({} chunks)", filename, summary.chunk_count);
        self.documents.insert(id, document);
        Ok(summary)
    }

    async fn get_chunks(&self, id: &str) -> Result<Vec<String>> {
        self.documents
            .get(id)
            .map(|doc| doc.chunks.clone())
            .ok_or_else(|| TreeError::DocumentNotFound(id.to_string()))
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let mut list: Vec<DocumentSummary> = self
            .documents
            .iter()
            .map(|entry| entry.value().summary(entry.key()))
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TreeError::DocumentNotFound(id.to_string()))
    }
}
