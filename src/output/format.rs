//! Record formatting
//!
//! Plain lines are `<url>[ [source: <kind>]][ [from: <origin>]]`; JSON lines
//! are `{"Source":..,"URL":..,"Where":..}`.

use crate::config::OutputConfig;
use crate::crawler::LinkRecord;
use crate::output::OutputError;

/// How each record is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Plain { show_source: bool, show_where: bool },
    Json,
}

impl RecordFormat {
    /// JSON wins over the plain-text decorations when both are set
    pub fn from_config(config: &OutputConfig) -> Self {
        if config.json {
            RecordFormat::Json
        } else {
            RecordFormat::Plain {
                show_source: config.show_source,
                show_where: config.show_where,
            }
        }
    }

    /// Renders one record, without the trailing newline
    pub fn render(&self, record: &LinkRecord) -> Result<String, OutputError> {
        match self {
            RecordFormat::Json => Ok(serde_json::to_string(record)?),
            RecordFormat::Plain {
                show_source,
                show_where,
            } => {
                let mut line = record.url.clone();
                if *show_source {
                    line.push_str(&format!(" [source: {}]", record.kind));
                }
                if *show_where {
                    line.push_str(&format!(" [from: {}]", record.origin));
                }
                Ok(line)
            }
        }
    }
}
