// SPDX-License-Identifier: MIT

//! Structured-output schemas for every model call in the workflow
//!
//! Each output type pairs a serde-deserializable struct with a static JSON
//! Schema handed to the provider. Confidence values outside `[0, 1]` are
//! rejected at decode time, never clamped.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::state::Intent;
use crate::provider::StructuredOutput;

fn check_unit_interval(field: &str, value: f32) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} {} outside [0, 1]", field, value))
    }
}

// --- Intent detection ---

/// Output of the intent-detection call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDetection {
    /// The detected intent category
    pub intent: Intent,
    /// Confidence score between 0.0 and 1.0
    pub confidence: f32,
    /// Extracted search keywords for retrieval intent
    #[serde(default)]
    pub search_query: Option<String>,
    /// Extracted URL for crawl_web intent
    #[serde(default)]
    pub url: Option<String>,
    /// Brief explanation of why this intent was chosen
    pub reasoning: String,
}

static INTENT_DETECTION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "enum": ["chat", "retrieval", "crawl_web"],
                "description": "The detected intent category"
            },
            "confidence": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
                "description": "Confidence score between 0.0 and 1.0"
            },
            "search_query": {
                "type": "string",
                "description": "Extracted search keywords for retrieval intent"
            },
            "url": {
                "type": "string",
                "description": "Extracted URL for crawl_web intent"
            },
            "reasoning": {
                "type": "string",
                "description": "Brief explanation of why this intent was chosen"
            }
        },
        "required": ["intent", "confidence", "reasoning"]
    })
});

impl StructuredOutput for IntentDetection {
    const NAME: &'static str = "IntentDetection";

    fn json_schema() -> &'static Value {
        &INTENT_DETECTION_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence", self.confidence)
    }
}

// --- Chat ---

/// The tone used in a direct chat response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Friendly,
    Professional,
    Helpful,
}

/// Output schema for direct chat responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    /// The conversational response to the user
    pub response_text: String,
    pub tone: Tone,
    /// Suggested follow-up questions
    #[serde(default)]
    pub follow_up_suggestions: Option<Vec<String>>,
}

static CHAT_ANSWER_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "response_text": {
                "type": "string",
                "description": "The conversational response to the user"
            },
            "tone": {
                "type": "string",
                "enum": ["friendly", "professional", "helpful"],
                "description": "The tone used in the response"
            },
            "follow_up_suggestions": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Optional suggested follow-up questions"
            }
        },
        "required": ["response_text", "tone"]
    })
});

impl StructuredOutput for ChatAnswer {
    const NAME: &'static str = "ChatAnswer";

    fn json_schema() -> &'static Value {
        &CHAT_ANSWER_SCHEMA
    }
}

// --- Retrieval ---

/// Output schema for the retrieval synthesis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalAnswer {
    /// Synthesized response using retrieved documents
    pub response_text: String,
    /// Source names/URLs that were cited
    pub sources_used: Vec<String>,
    /// Confidence in the answer based on document relevance
    pub confidence: f32,
    /// Whether the documents fully answered the query
    pub has_complete_answer: bool,
}

static RETRIEVAL_ANSWER_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "response_text": {
                "type": "string",
                "description": "Synthesized response using retrieved documents"
            },
            "sources_used": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of source names/URLs that were cited"
            },
            "confidence": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
                "description": "Confidence in the answer based on document relevance"
            },
            "has_complete_answer": {
                "type": "boolean",
                "description": "Whether the documents fully answered the query"
            }
        },
        "required": ["response_text", "sources_used", "confidence", "has_complete_answer"]
    })
});

impl StructuredOutput for RetrievalAnswer {
    const NAME: &'static str = "RetrievalAnswer";

    fn json_schema() -> &'static Value {
        &RETRIEVAL_ANSWER_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence", self.confidence)
    }
}

// --- Crawl ---

/// Output schema for the web-crawl synthesis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlAnswer {
    /// Synthesized summary of crawled content
    pub response_text: String,
    /// The URL that was crawled
    pub source_url: String,
    /// Whether the crawl was successful
    pub crawl_success: bool,
    /// Key points extracted from the page
    pub key_points: Vec<String>,
}

impl CrawlAnswer {
    /// Fixed result for a crawl_web intent without a URL. Produced without
    /// a model call.
    pub fn no_url() -> Self {
        Self {
            response_text: "No URL was provided to crawl.".to_string(),
            source_url: String::new(),
            crawl_success: false,
            key_points: Vec::new(),
        }
    }
}

static CRAWL_ANSWER_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "response_text": {
                "type": "string",
                "description": "Synthesized summary of crawled content"
            },
            "source_url": {
                "type": "string",
                "description": "The URL that was crawled"
            },
            "crawl_success": {
                "type": "boolean",
                "description": "Whether the crawl was successful"
            },
            "key_points": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of key points extracted from the page"
            }
        },
        "required": ["response_text", "source_url", "crawl_success", "key_points"]
    })
});

impl StructuredOutput for CrawlAnswer {
    const NAME: &'static str = "CrawlAnswer";

    fn json_schema() -> &'static Value {
        &CRAWL_ANSWER_SCHEMA
    }
}

// --- Final synthesis ---

/// Final output schema for the entire workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// The final polished response to show the user
    pub response_text: String,
    /// Which intent path was taken
    pub intent_used: Intent,
    /// Source names or URLs used to generate the response
    pub sources: Vec<String>,
    /// Overall confidence in the response
    pub confidence: f32,
}

static FINAL_ANSWER_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "response_text": {
                "type": "string",
                "description": "The final polished response to show the user"
            },
            "intent_used": {
                "type": "string",
                "enum": ["chat", "retrieval", "crawl_web"],
                "description": "Which intent path was taken"
            },
            "sources": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of source names or URLs used to generate the response"
            },
            "confidence": {
                "type": "number",
                "minimum": 0.0,
                "maximum": 1.0,
                "description": "Overall confidence in the response"
            }
        },
        "required": ["response_text", "intent_used", "sources", "confidence"]
    })
});

impl StructuredOutput for FinalAnswer {
    const NAME: &'static str = "FinalAnswer";

    fn json_schema() -> &'static Value {
        &FINAL_ANSWER_SCHEMA
    }

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence", self.confidence)
    }
}
