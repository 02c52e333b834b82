//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

use super::Connection;

/// TCP server for EmberKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    next_conn_id: AtomicU64,
}

/// Stops a running `Server` from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Ask the accept loop to exit
    ///
    /// Connections already being served are left to finish on their own.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Unblock accept()
        let _ = TcpStream::connect(self.wake_addr);
    }
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            engine,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            next_conn_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        let wake_ip = match self.local_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr: SocketAddr::new(wake_ip, self.local_addr.port()),
        }
    }

    /// Start the server (blocking until `shutdown`)
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Accept loop stopped");
        Ok(())
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let engine = Arc::clone(&self.engine);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let mut conn = match Connection::new(stream, engine) {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection {}: {}", id, e);
                        return;
                    }
                };
                if let Err(e) = conn.set_timeouts(read_ms, write_ms) {
                    tracing::warn!("Failed to set timeouts for {}: {}", conn.peer_addr(), e);
                    return;
                }
                // Errors were already logged by the connection
                let _ = conn.handle();
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn thread for connection {}: {}", id, e);
        }
    }
}
