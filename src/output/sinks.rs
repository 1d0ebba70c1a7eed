use async_trait::async_trait;
use log::error;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::utils::error::MonitorError;

use super::formatters::SampleFormatter;
use super::{Sample, UnsupportedFrame};

/// Receives presentation events from a client session. Implementations
/// must not assume one event per network read; a single readiness event
/// can carry several replies.
#[async_trait]
pub trait PresentationSink: Send {
    async fn on_sample(&mut self, sample: &Sample) -> Result<(), MonitorError>;
    async fn on_unsupported(&mut self, frame: &UnsupportedFrame) -> Result<(), MonitorError>;
}

pub struct StdoutSink {
    formatter: Box<dyn SampleFormatter>,
}

impl StdoutSink {
    pub fn new(formatter: Box<dyn SampleFormatter>) -> Self {
        let header = formatter.format_header();
        if !header.is_empty() {
            print!("{}", header);
        }
        Self { formatter }
    }
}

#[async_trait]
impl PresentationSink for StdoutSink {
    async fn on_sample(&mut self, sample: &Sample) -> Result<(), MonitorError> {
        print!("{}", self.formatter.format_sample(sample));
        Ok(())
    }

    async fn on_unsupported(&mut self, frame: &UnsupportedFrame) -> Result<(), MonitorError> {
        let text = self.formatter.format_unsupported(frame);
        if !text.is_empty() {
            print!("{}", text);
        }
        Ok(())
    }
}

pub struct FileSink {
    file_path: String,
    formatter: Box<dyn SampleFormatter>,
    header_written: bool,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(file_path: P, formatter: Box<dyn SampleFormatter>) -> Self {
        Self {
            file_path: file_path.as_ref().to_string_lossy().to_string(),
            formatter,
            header_written: false,
        }
    }

    async fn append(&mut self, text: &str) -> Result<(), MonitorError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .await
            .map_err(|e| {
                error!("❌ Failed to open file {}: {}", self.file_path, e);
                MonitorError::CommunicationError(format!("File open error: {}", e))
            })?;
        file.write_all(text.as_bytes()).await.map_err(|e| {
            error!("❌ Failed to write to file {}: {}", self.file_path, e);
            MonitorError::CommunicationError(format!("File write error: {}", e))
        })?;
        Ok(())
    }
}

#[async_trait]
impl PresentationSink for FileSink {
    async fn on_sample(&mut self, sample: &Sample) -> Result<(), MonitorError> {
        if !self.header_written {
            let header = self.formatter.format_header();
            if !header.is_empty() {
                self.append(&header).await?;
            }
            self.header_written = true;
        }
        let mut text = self.formatter.format_sample(sample);
        if !text.ends_with('\n') {
            text.push('\n');
        }
        self.append(&text).await
    }

    async fn on_unsupported(&mut self, frame: &UnsupportedFrame) -> Result<(), MonitorError> {
        let mut text = self.formatter.format_unsupported(frame);
        if text.is_empty() {
            return Ok(());
        }
        if !text.ends_with('\n') {
            text.push('\n');
        }
        self.append(&text).await
    }
}
