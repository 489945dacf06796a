//! The rewrite engine: chunk fan-out, sequential inference, ordered merge.

use std::sync::Arc;

use tracing::{debug, info};

use redraft_core::{Result, RewriteLimits};
use redraft_text::chunking::split_text;

use crate::client::InferenceClient;
use crate::prompt;

/// Rewrites one document through the inference collaborator.
///
/// Chunks are processed strictly in order and any chunk failure aborts
/// the whole attempt; there is no partial-result fallback.
pub struct RewriteEngine {
    client: Arc<dyn InferenceClient>,
    limits: RewriteLimits,
}

impl RewriteEngine {
    pub fn new(client: Arc<dyn InferenceClient>, limits: RewriteLimits) -> Self {
        Self { client, limits }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub async fn rewrite(&self, original: &str) -> Result<String> {
        let chunks = split_text(original, self.limits.max_chunk_size, self.limits.overlap_size);

        if chunks.len() == 1 {
            return self
                .client
                .complete(
                    prompt::REWRITE_SYSTEM_PROMPT,
                    &prompt::single_document_prompt(&chunks[0].text),
                    self.limits.temperature,
                    self.limits.max_output_tokens,
                )
                .await;
        }

        info!("Rewriting document in {} chunks", chunks.len());

        let mut outputs: Vec<(usize, String)> = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            debug!("Rewriting chunk {}/{}", chunk.chunk_index + 1, chunk.total_chunks);
            let output = self
                .client
                .complete(
                    prompt::REWRITE_SYSTEM_PROMPT,
                    &prompt::chunk_prompt(chunk),
                    self.limits.temperature,
                    self.limits.max_output_tokens,
                )
                .await?;
            outputs.push((chunk.chunk_index, output));
        }

        // Merge by chunk index, not completion order.
        outputs.sort_by_key(|(index, _)| *index);
        let merged: Vec<String> = outputs.into_iter().map(|(_, text)| text).collect();
        Ok(merged.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use redraft_core::Error;
    use std::sync::Mutex;

    /// Scripted client: records user prompts, answers with its call
    /// number, optionally fails on one call.
    struct ScriptedClient {
        prompts: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    impl ScriptedClient {
        fn new(fail_on_call: Option<usize>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on_call,
            }
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedClient {
        async fn complete(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
            _temperature: f64,
            _max_output_tokens: usize,
        ) -> Result<String> {
            let mut prompts = self.prompts.lock().unwrap();
            let call = prompts.len();
            prompts.push(user_prompt.to_string());
            if self.fail_on_call == Some(call) {
                return Err(Error::Inference("provider unavailable".into()));
            }
            Ok(format!("OUT{call}"))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn limits(max_chunk_size: usize, overlap: usize) -> RewriteLimits {
        RewriteLimits {
            max_chunk_size,
            overlap_size: overlap,
            ..RewriteLimits::default()
        }
    }

    #[tokio::test]
    async fn test_short_input_issues_single_call() {
        let client = Arc::new(ScriptedClient::new(None));
        let engine = RewriteEngine::new(client.clone(), limits(10_000, 200));

        let out = engine.rewrite("Case 1001. Short report.").await.unwrap();
        assert_eq!(out, "OUT0");

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Case 1001. Short report."));
        assert!(prompts[0].contains("section structure"));
    }

    #[tokio::test]
    async fn test_long_input_merges_chunks_in_order() {
        let client = Arc::new(ScriptedClient::new(None));
        let engine = RewriteEngine::new(client.clone(), limits(200, 40));

        let text = "The officer recorded the statement. ".repeat(30);
        let out = engine.rewrite(&text).await.unwrap();

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts.len() > 1);
        assert!(prompts[0].contains(&format!("part 1 of {}", prompts.len())));
        assert!(prompts[1].contains("part 2 of"));

        let expected: Vec<String> = (0..prompts.len()).map(|i| format!("OUT{i}")).collect();
        assert_eq!(out, expected.join("\n"));
    }

    #[tokio::test]
    async fn test_chunk_failure_aborts_whole_rewrite() {
        let client = Arc::new(ScriptedClient::new(Some(1)));
        let engine = RewriteEngine::new(client.clone(), limits(200, 40));

        let text = "The officer recorded the statement. ".repeat(30);
        let err = engine.rewrite(&text).await.unwrap_err();
        assert_eq!(err.error_type(), "inference");

        // The failing call stops the fan-out.
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }
}
