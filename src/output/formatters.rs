use serde_json::json;

use super::{Sample, UnsupportedFrame};

pub trait SampleFormatter: Send + Sync {
    fn format_sample(&self, sample: &Sample) -> String;
    fn format_unsupported(&self, frame: &UnsupportedFrame) -> String;
    fn format_header(&self) -> String;
}

pub struct ConsoleFormatter;

impl SampleFormatter for ConsoleFormatter {
    fn format_sample(&self, sample: &Sample) -> String {
        let mut output = format!(
            "🔹 Reply #{} (tid=0x{:04X}, unit={}, fc=0x{:02X}):\n",
            sample.apply_count, sample.transaction_id, sample.unit_id, sample.function
        );
        for (i, value) in sample.floats.iter().enumerate() {
            output.push_str(&format!(
                "  row {}: {:.4}\n",
                sample.row_offset + i * 2,
                value
            ));
        }
        match sample.floats.first() {
            Some(first) if sample.apply_count > 0 => {
                // Running average of the lead value over the session,
                // matching the device vendor's display.
                output.push_str(&format!(
                    "  avg: {:.4}\n",
                    first / sample.apply_count as f32
                ));
            }
            _ => output.push_str("  (no register data)\n"),
        }
        output
    }

    fn format_unsupported(&self, frame: &UnsupportedFrame) -> String {
        format!(
            "⚠️ Unsupported function 0x{:02X} (tid=0x{:04X}, unit={}, {} bytes)\n",
            frame.function, frame.transaction_id, frame.unit_id, frame.frame_len
        )
    }

    fn format_header(&self) -> String {
        format!(
            "🚀 Field Bus Monitor - {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
        )
    }
}

pub struct JsonFormatter;

impl SampleFormatter for JsonFormatter {
    fn format_sample(&self, sample: &Sample) -> String {
        serde_json::to_string(sample).unwrap_or_default()
    }

    fn format_unsupported(&self, frame: &UnsupportedFrame) -> String {
        let value = json!({
            "unsupported": true,
            "timestamp": frame.timestamp.to_rfc3339(),
            "transaction_id": frame.transaction_id,
            "unit_id": frame.unit_id,
            "function": frame.function,
            "frame_len": frame.frame_len,
        });
        serde_json::to_string(&value).unwrap_or_default()
    }

    fn format_header(&self) -> String {
        String::new()
    }
}

pub struct CsvFormatter;

impl SampleFormatter for CsvFormatter {
    fn format_sample(&self, sample: &Sample) -> String {
        let mut csv = String::new();
        let timestamp = sample.timestamp.to_rfc3339();
        for (i, value) in sample.floats.iter().enumerate() {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                timestamp,
                sample.apply_count,
                sample.function,
                sample.row_offset + i * 2,
                value
            ));
        }
        csv
    }

    fn format_unsupported(&self, _frame: &UnsupportedFrame) -> String {
        String::new()
    }

    fn format_header(&self) -> String {
        "Timestamp,ApplyCount,Function,Row,Value\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> Sample {
        Sample {
            timestamp: Utc::now(),
            transaction_id: 0x0013,
            unit_id: 1,
            function: 0x03,
            apply_count: 3,
            row_offset: 4,
            registers: vec![0x4000, 0x0000],
            floats: vec![2.0],
        }
    }

    #[test]
    fn test_console_formatter_rows() {
        let text = ConsoleFormatter.format_sample(&sample());
        assert!(text.contains("Reply #3"));
        assert!(text.contains("row 4: 2.0000"));
        // lead float divided by the apply count: 2.0 / 3
        assert!(text.contains("avg: 0.6667"));
    }

    #[test]
    fn test_json_formatter_is_valid_json() {
        let text = JsonFormatter.format_sample(&sample());
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["transaction_id"], 0x13);
        assert_eq!(value["floats"][0], 2.0);
    }

    #[test]
    fn test_csv_formatter_one_line_per_float() {
        let mut s = sample();
        s.registers = vec![0x4000, 0x0000, 0x3F80, 0x0000];
        s.floats = vec![2.0, 1.0];
        let text = CsvFormatter.format_sample(&s);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().contains(",6,"));
    }
}
