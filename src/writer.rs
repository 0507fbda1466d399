//! Write serialization and pacing for one relay connection.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::Result;
use crate::protocol::{Command, CommandKind, ResponseFrame, State};
use crate::session::Session;

/// Pause after each write, giving the relay time to process the command.
pub(crate) const PAUSE_BETWEEN_WRITES: Duration = Duration::from_millis(150);

/// Serializes command round-trips on one session.
///
/// The relay is a small embedded controller without a request queue; unpaced
/// back-to-back writes corrupt or drop its state. Every command therefore
/// goes through [`SequentialWriter::execute`], which holds an exclusive
/// section for the whole write → pace → read cycle. A second command cannot
/// start writing until the pacing interval after the previous write has
/// elapsed and the previous reply has been consumed, and reads are never
/// interleaved with another task's write.
///
/// The frame counter lives behind the same lock as the session, so it is
/// only ever read and advanced under this exclusivity.
#[derive(Debug)]
pub(crate) struct SequentialWriter {
    inner: Mutex<Inner>,
    pause: Duration,
}

#[derive(Debug)]
struct Inner {
    session: Session,
    state: State,
}

impl SequentialWriter {
    pub fn new(session: Session) -> Self {
        Self::with_pause(session, PAUSE_BETWEEN_WRITES)
    }

    fn with_pause(session: Session, pause: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                session,
                state: State::new(),
            }),
            pause,
        }
    }

    /// Run one command round-trip: encode with the current frame number,
    /// write, advance the counter, pace, read the 64-byte reply.
    ///
    /// The counter advances once the write succeeds; a failure while reading
    /// or decoding the reply does not roll it back. Cancellation at any await
    /// point releases the lock through guard drop.
    pub async fn execute(&self, kind: CommandKind) -> Result<ResponseFrame> {
        let mut inner = self.inner.lock().await;
        let command = Command::new(&inner.state, kind);
        tracing::debug!(
            "Sending {:?} as frame {} to {}",
            kind,
            command.frame_number(),
            inner.session.host()
        );
        inner.session.write(command.raw()).await?;
        inner.state.advance();
        sleep(self.pause).await;
        let raw = inner.session.read_response().await?;
        Ok(ResponseFrame::new(raw, kind))
    }

    /// Close the session once any in-flight round-trip has finished.
    pub async fn close(&self) -> Result<()> {
        self.inner.lock().await.session.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RESPONSE_LEN;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::Instant;

    const PING_FRAME_LEN: usize = 8;

    async fn writer_with_peer(pause: Duration) -> (Arc<SequentialWriter>, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let open = Session::open("127.0.0.1", addr.port(), Duration::from_secs(1));
        let (session, accepted) = tokio::join!(open, listener.accept());
        let writer = Arc::new(SequentialWriter::with_pause(session.unwrap(), pause));
        (writer, accepted.unwrap().0)
    }

    /// Read one ping-sized frame and answer with an arbitrary 64-byte reply.
    async fn serve_one(peer: &mut TcpStream) -> (Instant, [u8; PING_FRAME_LEN]) {
        let mut frame = [0u8; PING_FRAME_LEN];
        peer.read_exact(&mut frame).await.unwrap();
        let received_at = Instant::now();
        peer.write_all(&[0u8; RESPONSE_LEN]).await.unwrap();
        (received_at, frame)
    }

    #[tokio::test]
    async fn frame_numbers_increment_per_write() {
        let (writer, mut peer) = writer_with_peer(Duration::from_millis(1)).await;
        let server = tokio::spawn(async move {
            let mut numbers = Vec::new();
            for _ in 0..3 {
                let (_, frame) = serve_one(&mut peer).await;
                numbers.push(frame[5]);
            }
            numbers
        });
        for _ in 0..3 {
            writer.execute(CommandKind::Ping).await.unwrap();
        }
        assert_eq!(server.await.unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn concurrent_writes_are_paced() {
        let pause = Duration::from_millis(100);
        let (writer, mut peer) = writer_with_peer(pause).await;
        let server = tokio::spawn(async move {
            let (first, _) = serve_one(&mut peer).await;
            let (second, _) = serve_one(&mut peer).await;
            second.duration_since(first)
        });

        let a = writer.clone();
        let b = writer.clone();
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.execute(CommandKind::Ping).await }),
            tokio::spawn(async move { b.execute(CommandKind::Ping).await }),
        );
        ra.unwrap().unwrap();
        rb.unwrap().unwrap();

        // small allowance for loopback delivery jitter on the first write
        let floor = pause - Duration::from_millis(10);
        let gap = server.await.unwrap();
        assert!(gap >= floor, "writes only {gap:?} apart");
    }

    #[tokio::test]
    async fn reply_is_paired_with_its_request() {
        let (writer, mut peer) = writer_with_peer(Duration::from_millis(1)).await;
        tokio::spawn(async move {
            let mut frame = [0u8; PING_FRAME_LEN];
            peer.read_exact(&mut frame).await.unwrap();
            let mut reply = [0u8; RESPONSE_LEN];
            reply[..4].copy_from_slice(&[0x55, 0xAA, 0x5A, 0xA5]);
            reply[5] = 7;
            reply[6] = 4;
            peer.write_all(&reply).await.unwrap();
        });
        let frame = writer
            .execute(CommandKind::GetZoneInfo { zone: 7 })
            .await
            .unwrap();
        assert_eq!(frame.request(), CommandKind::GetZoneInfo { zone: 7 });
    }
}
