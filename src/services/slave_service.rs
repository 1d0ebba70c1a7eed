use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::modbus::ServerSession;
use crate::store::{MemoryRegisterTable, RegisterStore};
use crate::utils::error::MonitorError;
use crate::utils::spaced_hex;

/// TCP register server: shares one register table across all client
/// connections, each of which gets its own framing session.
pub struct SlaveService {
    config: ServerConfig,
    table: Arc<MemoryRegisterTable>,
}

impl SlaveService {
    pub fn new(config: ServerConfig) -> Self {
        let table = if config.seed_registers {
            info!("🗄️  Seeding {} register rows with demo pattern", config.table_rows);
            MemoryRegisterTable::with_demo_pattern(config.table_rows)
        } else {
            MemoryRegisterTable::new(config.table_rows)
        };
        Self {
            config,
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> Arc<MemoryRegisterTable> {
        self.table.clone()
    }

    pub async fn run(self) -> Result<(), MonitorError> {
        let bind = format!("{}:{}", self.config.bind, self.config.port);
        let listener = TcpListener::bind(&bind).await?;
        info!("🚀 Register server listening on {}", bind);

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Stopping register server...");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            info!("🔌 Client connected: {}", peer);
                            let table = self.table.clone();
                            sessions.spawn(async move {
                                if let Err(e) = handle_connection(stream, peer, table).await {
                                    warn!("connection {} ended with error: {}", peer, e);
                                }
                                info!("📵 Client disconnected: {}", peer);
                            });
                        }
                        Err(e) => {
                            warn!("accept failed: {}", e);
                        }
                    }
                }
                // Reap finished handlers so the set stays small.
                Some(_) = sessions.join_next(), if !sessions.is_empty() => {}
            }
        }

        // Partially buffered frames die with their sessions.
        sessions.abort_all();
        Ok(())
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    table: Arc<MemoryRegisterTable>,
) -> Result<(), MonitorError> {
    let mut session = ServerSession::new();
    let mut buf = vec![0u8; 512];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        for reply in session.ingest(&buf[..n], table.as_ref() as &dyn RegisterStore) {
            debug!("Modbus Resp [{}]: {}", peer, spaced_hex(&reply));
            stream.write_all(&reply).await?;
        }
    }
}
