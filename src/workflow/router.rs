// SPDX-License-Identifier: MIT

//! Conditional routing from classified intent to branch node

use super::state::{Intent, NodeName};

/// Total mapping from intent to the branch that processes it.
///
/// Exhaustive over the closed [Intent] set; there is no default arm to fall
/// through, so an unroutable intent cannot exist past deserialization.
pub fn route(intent: Intent) -> NodeName {
    match intent {
        Intent::Chat => NodeName::Chat,
        Intent::Retrieval => NodeName::Retrieval,
        Intent::CrawlWeb => NodeName::CrawlWeb,
    }
}
