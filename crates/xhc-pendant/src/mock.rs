//! In-memory transport for tests and bench setups without a receiver.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use hid_xhc_protocol::{OUTPUT_BLOCK_COUNT, OUTPUT_BLOCK_LEN, OutputBlocks};
use parking_lot::Mutex;

use crate::error::{PendantError, PendantResult};
use crate::session::{PendantTransport, StopHandle};

#[derive(Debug, Clone)]
enum Inbound {
    Frame(Vec<u8>),
    Timeout,
    Failure(String),
}

/// Scripted transport. Clones share their queues, so a test can keep one
/// handle while the session owns another.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inbound: Arc<Mutex<VecDeque<Inbound>>>,
    sent: Arc<Mutex<Vec<[u8; OUTPUT_BLOCK_LEN]>>>,
    connected: Arc<Mutex<bool>>,
    stop_when_drained: Arc<Mutex<Option<StopHandle>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(Mutex::new(true)),
            stop_when_drained: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue one transfer to be returned by the next receive.
    pub fn queue_frame(&self, frame: impl Into<Vec<u8>>) {
        self.inbound.lock().push_back(Inbound::Frame(frame.into()));
    }

    /// Queue an empty receive.
    pub fn queue_timeout(&self) {
        self.inbound.lock().push_back(Inbound::Timeout);
    }

    /// Queue a receive that fails with a transport error.
    pub fn queue_failure(&self, reason: impl Into<String>) {
        self.inbound
            .lock()
            .push_back(Inbound::Failure(reason.into()));
    }

    /// Trigger `handle` on the first receive that finds the queue empty.
    pub fn stop_when_drained(&self, handle: StopHandle) {
        *self.stop_when_drained.lock() = Some(handle);
    }

    /// Transfers still waiting to be received.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inbound.lock().len()
    }

    /// Every block sent so far.
    #[must_use]
    pub fn sent_blocks(&self) -> Vec<[u8; OUTPUT_BLOCK_LEN]> {
        self.sent.lock().clone()
    }

    /// Sent blocks grouped into complete display updates.
    #[must_use]
    pub fn sent_displays(&self) -> Vec<OutputBlocks> {
        self.sent
            .lock()
            .chunks_exact(OUTPUT_BLOCK_COUNT)
            .filter_map(|chunk| <OutputBlocks>::try_from(chunk).ok())
            .collect()
    }

    /// The most recent complete display update.
    #[must_use]
    pub fn last_display(&self) -> Option<OutputBlocks> {
        self.sent_displays().pop()
    }

    pub fn disconnect(&self) {
        *self.connected.lock() = false;
    }

    pub fn reconnect(&self) {
        *self.connected.lock() = true;
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.lock()
    }

    fn ensure_connected(&self) -> PendantResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(PendantError::transport("device disconnected"))
        }
    }
}

impl PendantTransport for MockTransport {
    fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> PendantResult<Option<usize>> {
        self.ensure_connected()?;

        let next = self.inbound.lock().pop_front();
        match next {
            Some(Inbound::Frame(frame)) => {
                for (slot, byte) in buf.iter_mut().zip(&frame) {
                    *slot = *byte;
                }
                Ok(Some(frame.len()))
            }
            Some(Inbound::Timeout) => Ok(None),
            Some(Inbound::Failure(reason)) => Err(PendantError::transport(reason)),
            None => {
                if let Some(handle) = self.stop_when_drained.lock().as_ref() {
                    handle.stop();
                }
                Ok(None)
            }
        }
    }

    fn send_block(&mut self, block: &[u8; OUTPUT_BLOCK_LEN]) -> PendantResult<()> {
        self.ensure_connected()?;
        self.sent.lock().push(*block);
        Ok(())
    }
}
