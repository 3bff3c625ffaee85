//! Test utilities for transport-level testing
//!
//! Provides a scripted transport that replays a fixed sequence of read events
//! and records everything written to it.

use crate::transport::SerialTransport;
use async_trait::async_trait;
use fanboy_core::{FanBoyError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted outcome of a transport read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadEvent {
    /// No byte before the read timeout
    Idle,
    /// Bytes delivered, possibly across several reads
    Data(Vec<u8>),
    /// I/O failure
    Fail(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    script: VecDeque<ReadEvent>,
    pending: VecDeque<u8>,
    written: Vec<u8>,
    reads: usize,
    clears: usize,
    write_limit: Option<usize>,
}

/// Scripted transport; clones share state so a test can keep a handle
/// after boxing one into a controller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    /// A transport that never delivers data
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(events: Vec<ReadEvent>) -> Self {
        let transport = Self::new();
        transport.push_events(events);
        transport
    }

    /// Accept at most `limit` bytes per write
    pub fn with_write_limit(self, limit: usize) -> Self {
        self.state.lock().unwrap().write_limit = Some(limit);
        self
    }

    pub fn push_events(&self, events: Vec<ReadEvent>) {
        self.state.lock().unwrap().script.extend(events);
    }

    /// Queue a reply that arrives immediately
    pub fn push_reply(&self, bytes: Vec<u8>) {
        self.push_events(vec![ReadEvent::Data(bytes)]);
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }
}

#[async_trait]
impl SerialTransport for ScriptedTransport {
    async fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let n = state.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        state.written.extend_from_slice(&data[..n]);
        Ok(n)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;

        if state.pending.is_empty() {
            match state.script.pop_front() {
                None | Some(ReadEvent::Idle) => return Ok(0),
                Some(ReadEvent::Fail(msg)) => return Err(FanBoyError::Serial(msg)),
                Some(ReadEvent::Data(bytes)) => state.pending.extend(bytes),
            }
        }

        let n = buf.len().min(state.pending.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        self.state.lock().unwrap().clears += 1;
        Ok(())
    }

    fn port_path(&self) -> Option<&str> {
        None
    }
}
