use log::{debug, error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{interval, timeout, Duration};

use crate::config::ClientConfig;
use crate::modbus::{build_multi_block_read_request, build_read_request, ClientSession};
use crate::output::{
    ConsoleFormatter, CsvFormatter, FileSink, JsonFormatter, PresentationSink, SampleFormatter,
    StdoutSink,
};
use crate::utils::error::MonitorError;
use crate::utils::spaced_hex;

/// Fixed transaction id used for every poll request; the device echoes
/// it back but nothing correlates on it.
const POLL_TRANSACTION_ID: u16 = 0x0013;

/// Periodically polls a register server and forwards decoded replies
/// to the configured sink.
pub struct PollService {
    config: ClientConfig,
    session: ClientSession,
    sink: Box<dyn PresentationSink>,
}

impl PollService {
    pub fn new(config: ClientConfig) -> Result<Self, MonitorError> {
        let formatter: Box<dyn SampleFormatter> = match config.output_format.as_str() {
            "json" => {
                info!("🎨 Using JSON formatter");
                Box::new(JsonFormatter)
            }
            "csv" => {
                info!("🎨 Using CSV formatter");
                Box::new(CsvFormatter)
            }
            _ => Box::new(ConsoleFormatter),
        };

        let sink: Box<dyn PresentationSink> = match &config.output_file {
            Some(path) => {
                info!("📝 Writing samples to {}", path);
                Box::new(FileSink::new(path, formatter))
            }
            None => Box::new(StdoutSink::new(formatter)),
        };

        let session = ClientSession::new(config.swap_words);
        Ok(Self {
            config,
            session,
            sink,
        })
    }

    pub async fn run(mut self) -> Result<(), MonitorError> {
        let target = format!("{}:{}", self.config.host, self.config.port);
        info!("🔌 Connecting to {}", target);

        let stream = timeout(
            Duration::from_millis(self.config.connect_timeout_ms),
            TcpStream::connect(&target),
        )
        .await?
        .map_err(|e| MonitorError::ConnectionError(format!("{}: {}", target, e)))?;
        info!("✅ Connected to {}", target);

        let (mut reader, mut writer) = stream.into_split();
        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));
        let mut read_buf = vec![0u8; 4096];

        info!(
            "🔄 Polling {} address block(s) every {} ms",
            self.config.addresses.len(),
            self.config.poll_interval_ms
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Stopping poll service...");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(request) = self.build_request() else {
                        continue;
                    };
                    debug!("Modbus Req : {}", spaced_hex(&request));
                    // Fire and forget; replies come back through the
                    // read arm whenever the device answers.
                    if let Err(e) = writer.write_all(&request).await {
                        error!("❌ Request write failed: {}", e);
                        break;
                    }
                }
                read = reader.read(&mut read_buf) => {
                    match read {
                        Ok(0) => {
                            warn!("📵 Server closed the connection");
                            break;
                        }
                        Ok(n) => {
                            self.session.ingest(&read_buf[..n], self.sink.as_mut()).await;
                        }
                        Err(e) => {
                            error!("❌ Read failed: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        info!(
            "📊 Session closed after {} applied replies",
            self.session.apply_count()
        );
        Ok(())
    }

    /// One address polls as a plain register read; several poll as one
    /// multi-block request.
    fn build_request(&self) -> Option<Vec<u8>> {
        if let [address] = self.config.addresses.as_slice() {
            let Ok(display_addr) = address.trim().parse::<u16>() else {
                warn!("address '{}' is not a number, skipping this poll", address);
                return None;
            };
            Some(build_read_request(
                POLL_TRANSACTION_ID,
                self.config.unit_id,
                display_addr.saturating_sub(1),
                self.config.register_count,
            ))
        } else {
            Some(build_multi_block_read_request(
                POLL_TRANSACTION_ID,
                self.config.unit_id,
                &self.config.addresses,
                self.config.register_count,
            ))
        }
    }
}
