//! Text-to-Cypher retrieval.

use std::sync::Arc;

use tracing::{debug, info};

use crate::llm::LanguageModel;
use crate::storage::{GraphBackend, ProcedureResult};
use crate::Result;
use super::prompt::text2cypher_prompt;

/// Records retrieved for one question, plus the Cypher that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverResult {
    pub cypher: String,
    /// One `<Record col=value ...>` line per returned row.
    pub items: Vec<String>,
}

impl RetrieverResult {
    /// Context block for the answer prompt.
    pub fn context(&self) -> String {
        self.items.join("\n")
    }
}

/// Translates a question into Cypher with the model, then runs it.
pub struct Text2CypherRetriever<B: GraphBackend, L: LanguageModel> {
    backend: Arc<B>,
    llm: Arc<L>,
    schema: String,
    examples: Vec<String>,
}

impl<B: GraphBackend, L: LanguageModel> Text2CypherRetriever<B, L> {
    pub fn new(backend: Arc<B>, llm: Arc<L>, schema: impl Into<String>, examples: Vec<String>) -> Self {
        Self { backend, llm, schema: schema.into(), examples }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub async fn search(&self, question: &str) -> Result<RetrieverResult> {
        let prompt = text2cypher_prompt(&self.schema, &self.examples, question);
        let completion = self.llm.invoke(&prompt, None).await?;
        let cypher = extract_cypher(&completion);
        info!(model = self.llm.model_name(), %cypher, "generated cypher");

        let records = self.backend.execute_raw(&cypher).await?;
        debug!(rows = records.rows.len(), "cypher returned");

        Ok(RetrieverResult { items: format_records(&records), cypher })
    }
}

/// Strip code fences and a leading `cypher` tag that models add despite
/// being told not to.
pub fn extract_cypher(completion: &str) -> String {
    let trimmed = completion.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    let body = body
        .strip_prefix("cypher")
        .or_else(|| body.strip_prefix("Cypher"))
        .unwrap_or(body);
    body.trim().to_string()
}

/// Render rows as `<Record a.code='N01' n=1>`, columns in result order.
pub fn format_records(records: &ProcedureResult) -> Vec<String> {
    records
        .rows
        .iter()
        .map(|row| {
            let fields: Vec<String> = records
                .columns
                .iter()
                .filter_map(|col| row.get(col).map(|v| format!("{col}={v}")))
                .collect();
            format!("<Record {}>", fields.join(" "))
        })
        .collect()
}
