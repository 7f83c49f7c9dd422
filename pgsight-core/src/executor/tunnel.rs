//! SSH local port forwarding
//!
//! [`SshTunnel`] binds an ephemeral local port and forwards accepted
//! connections through an SSH session to the database host, the way
//! `ssh -L` does. The session lives on a dedicated thread; the listener and
//! the channel pump both run non-blocking so the thread can notice shutdown.
//!
//! Everything here is blocking std IO. Async callers go through
//! `tokio::task::spawn_blocking`.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ssh2::{Channel, Session};

use crate::config::TunnelParams;
use crate::error::{ReportError, ReportResult};

const ACCEPT_POLL: Duration = Duration::from_millis(10);
const PUMP_IDLE: Duration = Duration::from_millis(5);
const WRITE_RETRY: Duration = Duration::from_millis(2);

/// A live SSH local forward. Dropping it stops the worker thread and closes
/// the listener.
#[derive(Debug)]
pub struct SshTunnel {
    local_port: u16,
    shutdown: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl SshTunnel {
    /// Connect, authenticate and start forwarding `127.0.0.1:<local_port>`
    /// to `target_host:target_port` through the SSH host
    pub fn open_blocking(
        params: &TunnelParams,
        target_host: &str,
        target_port: u16,
    ) -> ReportResult<Self> {
        params.validate()?;

        let addr = format!("{}:{}", params.ssh_host, params.ssh_port);
        let stream = TcpStream::connect(&addr)
            .map_err(|e| ReportError::Tunnel(format!("connect {addr}: {e}")))?;
        let mut session =
            Session::new().map_err(|e| ReportError::Tunnel(format!("session init: {e}")))?;
        session.set_tcp_stream(stream);
        session
            .handshake()
            .map_err(|e| ReportError::Tunnel(format!("handshake with {addr}: {e}")))?;
        authenticate(&session, params)?;

        let listener = TcpListener::bind(("127.0.0.1", 0))
            .map_err(|e| ReportError::Tunnel(format!("bind local listener: {e}")))?;
        let local_port = listener
            .local_addr()
            .map_err(|e| ReportError::Tunnel(format!("local listener address: {e}")))?
            .port();
        listener
            .set_nonblocking(true)
            .map_err(|e| ReportError::Tunnel(format!("local listener mode: {e}")))?;

        tracing::debug!(local_port, target_host, target_port, "ssh tunnel up");

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = thread::spawn({
            let shutdown = Arc::clone(&shutdown);
            let target_host = target_host.to_string();
            move || serve(session, listener, &target_host, target_port, &shutdown)
        });

        Ok(Self {
            local_port,
            shutdown,
            worker: Some(worker),
        })
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for SshTunnel {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn authenticate(session: &Session, params: &TunnelParams) -> ReportResult<()> {
    if let Some(key_path) = &params.ssh_key_path {
        session
            .userauth_pubkey_file(
                &params.ssh_user,
                None,
                key_path,
                params.ssh_key_passphrase.as_deref(),
            )
            .map_err(|e| ReportError::Tunnel(format!("key auth for {}: {e}", params.ssh_user)))?;
    } else if let Some(password) = &params.ssh_password {
        session
            .userauth_password(&params.ssh_user, password)
            .map_err(|e| {
                ReportError::Tunnel(format!("password auth for {}: {e}", params.ssh_user))
            })?;
    }
    if !session.authenticated() {
        return Err(ReportError::Tunnel(format!(
            "SSH authentication failed for {}",
            params.ssh_user
        )));
    }
    Ok(())
}

fn serve(
    session: Session,
    listener: TcpListener,
    target_host: &str,
    target_port: u16,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(e) = forward(&session, stream, target_host, target_port, shutdown) {
                    tracing::debug!("tunnel connection ended: {e}");
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                tracing::debug!("tunnel accept failed: {e}");
                break;
            }
        }
    }
}

/// Pump bytes between one accepted connection and a fresh SSH channel until
/// either side closes or shutdown is requested
fn forward(
    session: &Session,
    mut stream: TcpStream,
    target_host: &str,
    target_port: u16,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    session.set_blocking(true);
    let mut channel = session
        .channel_direct_tcpip(target_host, target_port, None)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    stream.set_nonblocking(true)?;
    session.set_blocking(false);

    let mut inbound = [0u8; 16 * 1024];
    let mut outbound = [0u8; 16 * 1024];
    let mut client_open = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let mut idle = true;

        if client_open {
            match stream.read(&mut inbound) {
                Ok(0) => {
                    client_open = false;
                    let _ = channel.send_eof();
                }
                Ok(n) => {
                    idle = false;
                    write_all_channel(&mut channel, &inbound[..n], shutdown)?;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => return Err(e),
            }
        }

        match channel.read(&mut outbound) {
            Ok(0) => break,
            Ok(n) => {
                idle = false;
                write_all_stream(&mut stream, &outbound[..n], shutdown)?;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if channel.eof() {
                    break;
                }
            }
            Err(e) => return Err(e),
        }

        if idle {
            thread::sleep(PUMP_IDLE);
        }
    }

    session.set_blocking(true);
    let _ = channel.close();
    Ok(())
}

fn write_all_channel(channel: &mut Channel, mut buf: &[u8], shutdown: &AtomicBool) -> io::Result<()> {
    while !buf.is_empty() {
        if shutdown.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "tunnel shut down"));
        }
        match channel.write(buf) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(WRITE_RETRY),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn write_all_stream(stream: &mut TcpStream, mut buf: &[u8], shutdown: &AtomicBool) -> io::Result<()> {
    while !buf.is_empty() {
        if shutdown.load(Ordering::Relaxed) {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "tunnel shut down"));
        }
        match stream.write(buf) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(WRITE_RETRY),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_missing_host() {
        let params = TunnelParams {
            ssh_host: String::new(),
            ssh_port: 22,
            ssh_user: "deploy".to_string(),
            ssh_password: Some("secret".to_string()),
            ssh_key_path: None,
            ssh_key_passphrase: None,
        };
        let err = SshTunnel::open_blocking(&params, "db.internal", 5432).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_open_rejects_missing_auth() {
        let params = TunnelParams {
            ssh_host: "bastion.example.com".to_string(),
            ssh_port: 22,
            ssh_user: "deploy".to_string(),
            ssh_password: None,
            ssh_key_path: None,
            ssh_key_passphrase: None,
        };
        let err = SshTunnel::open_blocking(&params, "db.internal", 5432).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("authentication"));
    }
}
