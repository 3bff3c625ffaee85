//! Byte-level transport abstraction and retry-bounded I/O helpers
//!
//! A transport read returns `Ok(0)` when no byte arrived within the per-read
//! timeout. The helpers here turn those idle reads into a retry budget.

use async_trait::async_trait;
use fanboy_core::protocol::SOF;
use fanboy_core::{FanBoyError, Result};
use tracing::warn;

/// Trait for serial transport abstraction
///
/// This trait enables testing of `FanBoyController` without real hardware
/// by allowing mock implementations.
#[async_trait]
pub trait SerialTransport: Send {
    /// Write bytes, returning how many were accepted (may be short)
    async fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read up to `buf.len()` bytes; `Ok(0)` means the read timed out idle
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Discard any pending input
    fn clear_input_buffer(&mut self) -> Result<()>;

    /// Get the port path for reconnection purposes
    fn port_path(&self) -> Option<&str>;
}

/// Write a whole frame; anything short of that is a transport failure
pub async fn send_all<T: SerialTransport + ?Sized>(transport: &mut T, data: &[u8]) -> Result<()> {
    let written = transport.write(data).await?;
    if written != data.len() {
        return Err(FanBoyError::ShortWrite {
            expected: data.len(),
            written,
        });
    }
    Ok(())
}

/// Fill `buf` completely.
///
/// Every idle read consumes one retry and every read that makes progress
/// resets the count. Fails once more than `retries` consecutive idle reads
/// have occurred.
pub async fn receive_exact<T: SerialTransport + ?Sized>(
    transport: &mut T,
    buf: &mut [u8],
    retries: u32,
) -> Result<()> {
    let mut filled = 0;
    let mut idle = 0u32;

    while filled < buf.len() {
        let n = transport.read(&mut buf[filled..]).await?;
        if n == 0 {
            idle += 1;
            if idle > retries {
                return Err(FanBoyError::Timeout(format!(
                    "received {} of {} bytes after {} idle reads",
                    filled,
                    buf.len(),
                    idle
                )));
            }
        } else {
            filled += n;
            idle = 0;
        }
    }

    Ok(())
}

/// Discard input until a start-of-frame byte arrives.
///
/// Each single-byte read gets the full `retries` budget; discarded bytes do
/// not consume it.
pub async fn sync_to_sof<T: SerialTransport + ?Sized>(transport: &mut T, retries: u32) -> Result<()> {
    let mut byte = [0u8; 1];
    let mut discarded = 0usize;

    loop {
        receive_exact(transport, &mut byte, retries).await?;
        if byte[0] == SOF {
            if discarded > 0 {
                warn!("Discarded {} bytes while waiting for start of frame", discarded);
            }
            return Ok(());
        }
        discarded += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ReadEvent, ScriptedTransport};

    #[tokio::test]
    async fn test_send_all_full_write() {
        let transport = ScriptedTransport::new();
        let mut t = transport.clone();
        send_all(&mut t, &[SOF, 0x01]).await.unwrap();
        assert_eq!(transport.written(), vec![SOF, 0x01]);
    }

    #[tokio::test]
    async fn test_send_all_short_write_fails() {
        let mut transport = ScriptedTransport::new().with_write_limit(1);
        let result = send_all(&mut transport, &[SOF, 0x04, 0, 42]).await;
        assert!(matches!(
            result,
            Err(FanBoyError::ShortWrite {
                expected: 4,
                written: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_receive_exact_idle_budget_boundary() {
        for r in 1..5u32 {
            // Exactly r idle reads, then the data
            let script = || {
                let mut events = vec![ReadEvent::Idle; r as usize];
                events.push(ReadEvent::Data(vec![1, 2, 3]));
                events
            };

            let mut transport = ScriptedTransport::with_script(script());
            let mut buf = [0u8; 3];
            receive_exact(&mut transport, &mut buf, r).await.unwrap();
            assert_eq!(buf, [1, 2, 3]);

            let mut transport = ScriptedTransport::with_script(script());
            let mut buf = [0u8; 3];
            let result = receive_exact(&mut transport, &mut buf, r - 1).await;
            assert!(
                matches!(result, Err(FanBoyError::Timeout(_))),
                "budget {} should fail after {} idle reads",
                r - 1,
                r
            );
        }
    }

    #[tokio::test]
    async fn test_receive_exact_progress_resets_counter() {
        // 2 idle reads before each chunk, budget 2: never exceeds it
        let mut transport = ScriptedTransport::with_script(vec![
            ReadEvent::Idle,
            ReadEvent::Idle,
            ReadEvent::Data(vec![1]),
            ReadEvent::Idle,
            ReadEvent::Idle,
            ReadEvent::Data(vec![2]),
            ReadEvent::Idle,
            ReadEvent::Idle,
            ReadEvent::Data(vec![3]),
        ]);
        let mut buf = [0u8; 3];
        receive_exact(&mut transport, &mut buf, 2).await.unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_receive_exact_zero_budget_requires_immediate_data() {
        let mut transport = ScriptedTransport::with_script(vec![ReadEvent::Data(vec![9])]);
        let mut buf = [0u8; 1];
        receive_exact(&mut transport, &mut buf, 0).await.unwrap();

        let mut transport = ScriptedTransport::new();
        let result = receive_exact(&mut transport, &mut buf, 0).await;
        assert!(matches!(result, Err(FanBoyError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_sync_to_sof_discards_noise() {
        let mut transport = ScriptedTransport::with_script(vec![
            ReadEvent::Data(vec![0x00, 0x13, 0x37]),
            ReadEvent::Idle,
            ReadEvent::Data(vec![SOF, 0x01]),
        ]);
        sync_to_sof(&mut transport, 2).await.unwrap();

        // The byte after SOF is still pending
        let mut tag = [0u8; 1];
        receive_exact(&mut transport, &mut tag, 0).await.unwrap();
        assert_eq!(tag, [0x01]);
    }

    #[tokio::test]
    async fn test_sync_to_sof_times_out_on_silence() {
        let mut transport = ScriptedTransport::new();
        let result = sync_to_sof(&mut transport, 2).await;
        assert!(matches!(result, Err(FanBoyError::Timeout(_))));
        assert_eq!(transport.reads(), 3);
    }
}
