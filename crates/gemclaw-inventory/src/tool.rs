//! Natural-language inventory questions answered through generated SQL.

use std::sync::Arc;

use async_trait::async_trait;
use gemclaw_core::error::{GemClawError, Result};
use gemclaw_core::traits::AnswerTool;
use gemclaw_core::traits::provider::{GenerateParams, Provider};

use crate::store::InventoryDb;

fn sql_prompt(schema: &str, question: &str) -> String {
    format!(
        "You are a SQL expert. Given this database schema:
{schema}

Write a SQLite query to answer: {question}

Return ONLY the raw SQL query. No markdown, no explanation."
    )
}

fn summary_prompt(question: &str, sql: &str, result: &str) -> String {
    format!(
        "The user asked: {question}
The SQL query was: {sql}
The result was: {result}

Provide a clear, natural language answer."
    )
}

/// Prefix for execution failures returned to the user instead of raised.
pub const SQL_ERROR_PREFIX: &str = "SQL Error:";

/// Remove markdown code fences the model adds despite being told not to.
///
/// The opening fence may carry a language tag in any case (```` ```Sql ````);
/// the tag is dropped up to the first whitespace unless it is the start of
/// the query itself.
pub fn strip_code_fences(raw: &str) -> String {
    let mut sql = raw.trim();
    if let Some(rest) = sql.strip_prefix("```") {
        let tag_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        let is_query = tag.eq_ignore_ascii_case("select") || tag.eq_ignore_ascii_case("with");
        sql = if is_query { rest } else { &rest[tag_end..] };
    }
    let sql = sql.trim();
    sql.strip_suffix("```").unwrap_or(sql).trim().to_string()
}

pub struct SqlQueryTool {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    db: Arc<InventoryDb>,
    max_rows: usize,
}

impl SqlQueryTool {
    pub fn new(provider: Arc<dyn Provider>, params: GenerateParams, db: Arc<InventoryDb>) -> Self {
        Self {
            provider,
            params,
            db,
            max_rows: 100,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    /// Ask the model for a single SQL statement answering `question`.
    pub async fn generate_sql(&self, schema: &str, question: &str) -> Result<String> {
        let raw = self
            .provider
            .complete(&sql_prompt(schema, question), &self.params)
            .await?;
        let sql = strip_code_fences(&raw);
        tracing::debug!("🧮 Generated SQL: {sql}");
        Ok(sql)
    }

    /// Execute a generated statement against the inventory, read-only.
    pub fn execute(&self, sql: &str) -> Result<String> {
        self.db.run_read_only(sql, self.max_rows)
    }
}

#[async_trait]
impl AnswerTool for SqlQueryTool {
    fn name(&self) -> &str {
        "inventory_sql"
    }

    async fn answer(&self, question: &str) -> Result<String> {
        let schema = self.db.table_info()?;
        let sql = self.generate_sql(&schema, question).await?;

        let result = match self.execute(&sql) {
            Ok(result) => result,
            Err(e) => {
                let message = match e {
                    GemClawError::Database(msg) => msg,
                    other => other.to_string(),
                };
                tracing::warn!("⚠️ SQL execution failed: {message}");
                return Ok(format!("{SQL_ERROR_PREFIX} {message}"));
            }
        };

        let prompt = summary_prompt(question, &sql, &result);
        self.provider.complete(&prompt, &self.params).await
    }
}
