use futures::stream::{self, StreamExt};
use newscheck_common::{BatchItem, BatchOutcome, BatchResult, ErrorRecord, Mode};
use tracing::{info, warn};

use crate::combiner::ScoreCombiner;

impl ScoreCombiner {
    /// Score every text with the same mode. Output order matches input
    /// order; a failing item is recorded in place and the rest still run.
    pub async fn predict_batch<S: AsRef<str>>(&self, texts: &[S], mode: Mode) -> BatchResult {
        if texts.is_empty() {
            return BatchResult::default();
        }

        info!(count = texts.len(), mode = %mode, "Scoring batch");

        let items: Vec<BatchItem> = stream::iter(texts.iter().enumerate())
            .map(|(index, text)| async move {
                let text = text.as_ref();
                let outcome = match self.predict(text, mode).await {
                    Ok(result) => BatchOutcome::Scored(result),
                    Err(e) => {
                        warn!(index, error = %e, "Batch item failed");
                        BatchOutcome::Failed(ErrorRecord::from(&e))
                    }
                };
                BatchItem {
                    input: text.to_string(),
                    outcome,
                }
            })
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let batch = BatchResult { items };
        let summary = batch.summary();
        info!(
            total = summary.total,
            fake = summary.fake,
            real = summary.real,
            failed = summary.failed,
            "Batch complete"
        );
        batch
    }
}
