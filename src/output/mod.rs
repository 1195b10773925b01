//! Output module for streaming crawl results
//!
//! This module handles:
//! - Rendering records as plain text or JSON lines
//! - Optional process-wide deduplication by URL
//! - The channel consumer that writes records as they arrive

mod dedup;
mod format;

pub use dedup::Deduplicator;
pub use format::RecordFormat;

use crate::crawler::LinkRecord;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drains the results channel into `writer`
///
/// Runs until every sender is dropped. Each line is flushed as soon as it is
/// written so results stream while the crawl is still running.
///
/// # Arguments
///
/// * `records` - Consumer side of the results channel
/// * `writer` - Destination, normally stdout
/// * `format` - Line format
/// * `dedup` - When set, only the first record for each URL is written
///
/// # Returns
///
/// * `Ok(u64)` - Number of lines written
/// * `Err(OutputError)` - The destination failed
pub async fn write_records<W>(
    mut records: mpsc::Receiver<LinkRecord>,
    writer: W,
    format: RecordFormat,
    dedup: Option<Arc<Deduplicator>>,
) -> Result<u64, OutputError>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(writer);
    let mut written = 0u64;

    while let Some(record) = records.recv().await {
        if let Some(dedup) = &dedup {
            if !dedup.is_first_seen(&record.url) {
                continue;
            }
        }

        let mut line = format.render(&record)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        written += 1;
    }

    writer.flush().await?;
    tracing::debug!("Output closed after {} lines", written);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::SourceKind;

    async fn write_all(records: Vec<LinkRecord>, dedup: Option<Arc<Deduplicator>>) -> String {
        let (tx, rx) = mpsc::channel(16);
        for record in records {
            tx.send(record).await.unwrap();
        }
        drop(tx);

        let mut out = Vec::new();
        let format = RecordFormat::Plain {
            show_source: true,
            show_where: false,
        };
        write_records(rx, &mut out, format, dedup).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn records() -> Vec<LinkRecord> {
        vec![
            LinkRecord::new(SourceKind::Href, "http://example.com/a", "http://example.com/"),
            LinkRecord::new(SourceKind::Form, "http://example.com/a", "http://example.com/b"),
            LinkRecord::new(SourceKind::Href, "http://example.com/c", "http://example.com/"),
        ]
    }

    #[tokio::test]
    async fn test_write_records_plain() {
        let out = write_all(records(), None).await;
        assert_eq!(
            out,
            "http://example.com/a [source: href]\n\
             http://example.com/a [source: form]\n\
             http://example.com/c [source: href]\n"
        );
    }

    #[tokio::test]
    async fn test_write_records_unique() {
        let dedup = Arc::new(Deduplicator::new());
        let out = write_all(records(), Some(dedup.clone())).await;
        assert_eq!(
            out,
            "http://example.com/a [source: href]\nhttp://example.com/c [source: href]\n"
        );
        assert_eq!(dedup.len(), 2);
    }

    #[tokio::test]
    async fn test_write_records_empty_channel() {
        assert_eq!(write_all(Vec::new(), None).await, "");
    }
}
