//! Output formatting for CLI

use mpegdash_engine::HostEventRecord;
use serde::Serialize;

/// Output format options
pub enum OutputFormat {
    Text,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Format a value based on selected format
pub fn format_output<T: Serialize + std::fmt::Display>(data: &T, format: &str) -> String {
    match OutputFormat::from(format) {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Text => data.to_string(),
    }
}

/// One line per host event
pub fn format_records(records: &[HostEventRecord], format: &str) -> String {
    match OutputFormat::from(format) {
        OutputFormat::Json => {
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Text => records
            .iter()
            .map(|record| {
                let mut payload = serde_json::to_value(&record.event).unwrap_or_default();
                if let Some(fields) = payload.as_object_mut() {
                    fields.remove("event");
                }
                let detail = match payload.as_object() {
                    Some(fields) if !fields.is_empty() => payload.to_string(),
                    _ => String::new(),
                };
                format!("{:>4}  {:<8} {}", record.sequence, record.event.name(), detail)
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpegdash_engine::HostEvent;

    fn record(sequence: u64, event: HostEvent) -> HostEventRecord {
        HostEventRecord {
            sequence,
            timestamp: Default::default(),
            event,
        }
    }

    #[test]
    fn test_text_records() {
        let records = vec![
            record(1, HostEvent::Resume),
            record(2, HostEvent::Progress { time: 1.5 }),
        ];
        let text = format_records(&records, "text");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "   1  resume");
        assert_eq!(lines[1], r#"   2  progress {"time":1.5}"#);
    }

    #[test]
    fn test_json_records() {
        let records = vec![record(1, HostEvent::Unload)];
        let json: serde_json::Value =
            serde_json::from_str(&format_records(&records, "json")).unwrap();
        assert_eq!(json[0]["event"], "unload");
        assert_eq!(json[0]["sequence"], 1);
    }
}
