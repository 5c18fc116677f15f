//! Accept loop and connection handling.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::error::{ProtocolError, ServerError};
use crate::protocol::commands::HttpRequest;
use crate::protocol::{handle_request, parse_request, protocol_error_response};
use crate::registry::AvatarRegistry;
use crate::utils::clock::{Clock, SystemClock};

pub struct Server {
    registry: Arc<AvatarRegistry>,
    listener: TcpListener,
    clock: Arc<dyn Clock>,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener and builds a registry from the configuration.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let registry = Arc::new(AvatarRegistry::new(config.registry_config()));
        Self::with_parts(config, registry, Arc::new(SystemClock)).await
    }

    /// Binds the listener around a caller-supplied registry and clock.
    ///
    /// Integration tests use this to drive the server with a pinned clock
    /// and a seeded registry.
    pub async fn with_parts(
        config: ServerConfig,
        registry: Arc<AvatarRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServerError> {
        let addr = config.socket_addr();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(e.into());
            }
        };

        Ok(Self {
            registry,
            listener,
            clock,
            config: Arc::new(config),
        })
    }

    /// The address the listener actually bound, useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop forever.
    pub async fn start(&self) {
        info!(
            "Starting avatar presence server on {} ({}x{} grid)",
            self.config.socket_addr(),
            self.config.grid_width,
            self.config.grid_height
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let clock = Arc::clone(&self.clock);
                    let config = Arc::clone(&self.config);

                    // Spawn a task per connection so the accept loop never blocks
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, registry, clock, config).await
                        {
                            warn!("Failed to handle connection from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Reads one HTTP request, dispatches it, writes the response, closes.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<AvatarRegistry>,
    clock: Arc<dyn Clock>,
    config: Arc<ServerConfig>,
) -> Result<(), ServerError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let response = match read_request(&mut reader, config.max_request_length).await {
        Ok(request) => match parse_request(&request) {
            Ok(command) => {
                info!("Received from {}: {:?}", addr, command);
                handle_request(&registry, &command, clock.now_ms()).await
            }
            Err(e) => {
                warn!("Bad request from {}: {}", addr, e);
                protocol_error_response(&e)
            }
        },
        Err(ServerError::Protocol(e)) => {
            warn!("Unreadable request from {}: {}", addr, e);
            protocol_error_response(&e)
        }
        Err(e) => return Err(e),
    };

    write_half.write_all(response.to_http().as_bytes()).await?;
    write_half.flush().await?;
    Ok(())
}

/// Reads the request line, headers and Content-Length-delimited body.
async fn read_request(
    reader: &mut BufReader<OwnedReadHalf>,
    max_request_length: usize,
) -> Result<HttpRequest, ServerError> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedRequest("empty request line".into()))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedRequest("request line without path".into()))?
        .to_string();

    let mut content_type = None;
    let mut content_length = 0usize;
    let mut total_len = line.len();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(
                ProtocolError::MalformedRequest("connection closed mid-headers".into()).into(),
            );
        }
        total_len += n;
        if total_len > max_request_length {
            return Err(ProtocolError::RequestTooLarge(total_len).into());
        }

        let header = line.trim_end_matches("\r\n");
        if header.is_empty() {
            break;
        }

        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-type" => content_type = Some(value.to_string()),
                "content-length" => {
                    content_length =
                        value
                            .parse::<usize>()
                            .map_err(|_| ProtocolError::InvalidField {
                                field: "Content-Length".into(),
                                value: value.to_string(),
                            })?;
                }
                _ => {}
            }
        }
    }

    if total_len + content_length > max_request_length {
        return Err(ProtocolError::RequestTooLarge(total_len + content_length).into());
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    Ok(HttpRequest {
        method,
        path,
        content_type,
        body,
    })
}
