// SPDX-License-Identifier: MIT

//! Prompt templates for the five structured-output calls

use super::state::Intent;

/// Prompt for the intent-detection call
pub fn intent_detection(context: &str, query: &str) -> String {
    format!(
        "You are the intent classifier for a Solana ecosystem assistant.\n\
         Classify the user's query into exactly one intent:\n\
         - chat: general questions answerable from model knowledge alone\n\
         - retrieval: questions about protocols, documentation, or concepts \
         that benefit from searching the indexed knowledge base; extract \
         concise search keywords into search_query\n\
         - crawl_web: the user asks about the content of a specific web page; \
         extract the URL into url\n\n\
         User context:\n{context}\n\n\
         Query:\n{query}\n\n\
         Respond with the intent, a confidence between 0.0 and 1.0, and a \
         brief reasoning."
    )
}

/// Prompt for the direct chat branch
pub fn chat_response(context: &str, query: &str) -> String {
    format!(
        "You are a knowledgeable, approachable assistant for the Solana \
         ecosystem (DeFi, staking, swaps, wallets).\n\
         Answer from your own knowledge. Do not invent protocol-specific \
         numbers; say so when you are unsure.\n\n\
         User context:\n{context}\n\n\
         Query:\n{query}"
    )
}

/// Prompt for the retrieval synthesis call
pub fn retrieval_synthesis(context: &str, query: &str, retrieved_docs: &str, sources: &str) -> String {
    format!(
        "You are answering a question about the Solana ecosystem using \
         retrieved documentation.\n\
         Ground every claim in the documents below and cite the sources you \
         actually used. If the documents do not contain the answer, say so, \
         report a low confidence, and set has_complete_answer to false.\n\n\
         User context:\n{context}\n\n\
         Query:\n{query}\n\n\
         Retrieved documents:\n{retrieved_docs}\n\n\
         Available sources: {sources}"
    )
}

/// Prompt for the web-crawl synthesis call
pub fn crawl_synthesis(context: &str, query: &str, url: &str, crawled_content: &str) -> String {
    format!(
        "You are summarizing a crawled web page for a Solana ecosystem user.\n\
         Answer the query using only the crawled content below. Extract the \
         key points. If the content indicates the crawl failed, explain that \
         clearly and set crawl_success to false.\n\n\
         User context:\n{context}\n\n\
         Query:\n{query}\n\n\
         Crawled URL: {url}\n\n\
         Crawled content:\n{crawled_content}"
    )
}

/// Prompt for the final synthesis call
pub fn final_output(
    context: &str,
    query: &str,
    processed_content: &str,
    intent: Intent,
    sources: &str,
) -> String {
    format!(
        "You are producing the final answer shown to the user.\n\
         Polish the processed content into a clear, well-structured response \
         to the original query. Keep the factual content unchanged, echo the \
         intent that was used, and list the sources.\n\n\
         User context:\n{context}\n\n\
         Original query:\n{query}\n\n\
         Intent used: {intent}\n\n\
         Processed content:\n{processed_content}\n\n\
         Sources: {sources}"
    )
}
