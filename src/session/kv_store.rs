use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::io::BufStream;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::resp::{read_reply, write_command, Reply};
use super::{decode_session, encode_session, Session, SessionStore, StoreError};

/// Session store backed by a RESP key-value service (Redis or compatible).
///
/// Holds a single connection shared by every request. No authentication is
/// sent and no expiry is set on stored keys.
///
/// A command owns the connection until its reply has been read in full. If
/// it fails or is dropped part way, the connection goes with it and the next
/// command opens a fresh one, so no caller can read a reply meant for another.
#[derive(Debug)]
pub struct KvSessionStore {
    addr: String,
    conn: Mutex<Option<BufStream<TcpStream>>>,
}

impl KvSessionStore {
    /// Connect to `addr` and verify the backend answers `PING`.
    ///
    /// Any failure here is a `StoreError::Connect`; startup treats it as fatal.
    pub async fn connect(addr: &str) -> Result<Self, StoreError> {
        debug!("Connecting to session backend at {}", addr);
        let stream = open(addr).await?;

        let store = Self { addr: addr.to_string(), conn: Mutex::new(Some(stream)) };
        if let Err(e) = store.ping().await {
            error!("Session backend at {} failed liveness check: {}", addr, e);
            return Err(StoreError::Connect { addr: addr.to_string(), source: Box::new(e) });
        }

        info!("Connected to session backend at {}", addr);
        Ok(store)
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn command(&self, args: &[&[u8]]) -> Result<Reply, StoreError> {
        let mut slot = self.conn.lock().await;
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => {
                warn!("Previous command on {} did not complete, reconnecting", self.addr);
                open(&self.addr).await?
            }
        };

        write_command(&mut conn, args).await?;
        let reply = read_reply(&mut conn).await?;
        *slot = Some(conn);

        match reply {
            Reply::Error(msg) => Err(StoreError::Backend(msg)),
            reply => Ok(reply),
        }
    }
}

async fn open(addr: &str) -> Result<BufStream<TcpStream>, StoreError> {
    let stream = TcpStream::connect(addr).await.map_err(|e| {
        error!("Session backend at {} is unreachable: {}", addr, e);
        StoreError::Connect { addr: addr.to_string(), source: Box::new(StoreError::Io(e)) }
    })?;
    Ok(BufStream::new(stream))
}

#[async_trait]
impl SessionStore for KvSessionStore {
    async fn set(&self, id: &str, session: &Session) -> Result<(), StoreError> {
        let payload = encode_session(session)?;
        match self.command(&[b"SET".as_slice(), id.as_bytes(), payload.as_bytes()]).await? {
            Reply::Simple(ref s) if s == "OK" => {
                debug!("Stored session '{}' ({} bytes)", id, payload.len());
                Ok(())
            }
            other => Err(StoreError::Protocol(format!("unexpected reply to SET: {:?}", other))),
        }
    }

    async fn get(&self, id: &str) -> Result<Session, StoreError> {
        match self.command(&[b"GET".as_slice(), id.as_bytes()]).await? {
            Reply::Bulk(Some(payload)) => decode_session(id, &payload),
            Reply::Bulk(None) => Err(StoreError::Missing(id.to_string())),
            other => Err(StoreError::Protocol(format!("unexpected reply to GET: {:?}", other))),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self.command(&[b"PING".as_slice()]).await? {
            Reply::Simple(ref s) if s == "PONG" => Ok(()),
            other => Err(StoreError::Protocol(format!("unexpected reply to PING: {:?}", other))),
        }
    }
}
