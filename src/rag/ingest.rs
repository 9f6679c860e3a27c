// SPDX-License-Identifier: MIT

//! Document ingestion pipeline: crawl, chunk, embed, upsert
//!
//! This is the admin path that populates the vector index the retrieval
//! branch searches. Collaborator failures here are surfaced to the caller
//! instead of being absorbed; an ingestion run has no degraded mode.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;

use super::vector_store::PineconeStore;
use super::EmbeddingClient;
use crate::crawl::{CrawledDocument, Crawler};
use crate::error::SolaiError;

/// Chunk size cap, aligned to paragraph boundaries where possible
const MAX_CHUNK_CHARS: usize = 1200;

/// A chunk prepared for indexing
#[derive(Debug, Clone)]
pub struct IndexableChunk {
    pub id: String,
    pub text: String,
    pub source_url: String,
    pub title: Option<String>,
}

impl IndexableChunk {
    /// Label surfaced to users when this chunk is cited
    pub fn source_label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.source_url)
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub documents_crawled: usize,
    pub chunks_prepared: usize,
    pub chunks_indexed: usize,
}

/// Crawl-to-index pipeline over the configured sources
pub struct Ingestor {
    crawler: Arc<dyn Crawler>,
    embeddings: Arc<dyn EmbeddingClient>,
    store: PineconeStore,
    source_urls: Vec<String>,
}

impl Ingestor {
    pub fn new(
        crawler: Arc<dyn Crawler>,
        embeddings: Arc<dyn EmbeddingClient>,
        store: PineconeStore,
        source_urls: Vec<String>,
    ) -> Self {
        Self {
            crawler,
            embeddings,
            store,
            source_urls,
        }
    }

    /// Crawl the given URLs (or the configured sources when `None`), chunk
    /// the documents, embed each chunk, and upsert into the index.
    pub async fn ingest(&self, urls: Option<Vec<String>>) -> Result<IngestReport, SolaiError> {
        let urls = urls.unwrap_or_else(|| self.source_urls.clone());

        let mut documents = Vec::new();
        for url in &urls {
            let docs = self.crawler.crawl(url).await?;
            log::info!("Crawled {} document(s) from {}", docs.len(), url);
            documents.extend(docs);
        }

        let chunks: Vec<IndexableChunk> = documents.iter().flat_map(chunk_document).collect();
        log::info!(
            "Prepared {} chunk(s) from {} document(s)",
            chunks.len(),
            documents.len()
        );

        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            embeddings.push(self.embeddings.embed(&chunk.text).await?);
        }

        let chunks_indexed = self.store.upsert_documents(&chunks, &embeddings).await?;

        Ok(IngestReport {
            documents_crawled: documents.len(),
            chunks_prepared: chunks.len(),
            chunks_indexed,
        })
    }
}

/// Split a crawled document into paragraph-aligned chunks under the size cap
pub fn chunk_document(doc: &CrawledDocument) -> Vec<IndexableChunk> {
    let content = if doc.markdown.is_empty() {
        &doc.html
    } else {
        &doc.markdown
    };
    let title = doc.metadata["title"].as_str().map(|t| t.to_string());

    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in content.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() + 2 > MAX_CHUNK_CHARS {
            push_chunk(&mut chunks, &current, doc, &title);
            current.clear();
        }

        if paragraph.len() > MAX_CHUNK_CHARS {
            // Oversized paragraph: hard-split on char boundaries
            for piece in split_oversized(paragraph) {
                push_chunk(&mut chunks, piece, doc, &title);
            }
            continue;
        }

        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        push_chunk(&mut chunks, &current, doc, &title);
    }

    chunks
}

fn push_chunk(
    chunks: &mut Vec<IndexableChunk>,
    text: &str,
    doc: &CrawledDocument,
    title: &Option<String>,
) {
    let ordinal = chunks.len();
    chunks.push(IndexableChunk {
        id: chunk_id(text, &doc.url, ordinal),
        text: text.to_string(),
        source_url: doc.url.clone(),
        title: title.clone(),
    });
}

/// Stable chunk id derived from source and content
fn chunk_id(text: &str, source: &str, ordinal: usize) -> String {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    text.hash(&mut hasher);
    format!("{:016x}-{}", hasher.finish(), ordinal)
}

fn split_oversized(paragraph: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = paragraph;
    while rest.len() > MAX_CHUNK_CHARS {
        let mut end = MAX_CHUNK_CHARS;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        pieces.push(&rest[..end]);
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(markdown: &str) -> CrawledDocument {
        CrawledDocument {
            markdown: markdown.to_string(),
            html: String::new(),
            metadata: json!({ "title": "Test Page" }),
            url: "https://docs.example.com/page".to_string(),
        }
    }

    #[test]
    fn test_small_document_is_one_chunk() {
        let chunks = chunk_document(&doc("First paragraph.\n\nSecond paragraph."));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(chunks[0].source_label(), "Test Page");
    }

    #[test]
    fn test_chunks_respect_size_cap() {
        let paragraph = "x".repeat(700);
        let content = format!("{}\n\n{}\n\n{}", paragraph, paragraph, paragraph);
        let chunks = chunk_document(&doc(&content));

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.text.len() <= MAX_CHUNK_CHARS);
        }
    }

    #[test]
    fn test_oversized_paragraph_is_hard_split() {
        let content = "y".repeat(3000);
        let chunks = chunk_document(&doc(&content));

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.text.len() <= MAX_CHUNK_CHARS));
    }

    #[test]
    fn test_chunk_ids_are_stable_and_distinct() {
        let chunks_a = chunk_document(&doc("alpha\n\nbeta"));
        let chunks_b = chunk_document(&doc("alpha\n\nbeta"));

        assert_eq!(chunks_a[0].id, chunks_b[0].id);

        let other = chunk_document(&doc("gamma"));
        assert_ne!(chunks_a[0].id, other[0].id);
    }
}
