// src/mock.rs

//! Scripted transports and a recording delay for unit tests.

use crate::common::hal_traits::{DatagramLink, Delay, SerialChannel, SerialOpener};
use core::time::Duration;
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Delay ---

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub delays_ms: Vec<u32>,
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

// --- Datagram link ---

#[derive(Debug)]
pub enum LinkEvent {
    Reply(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Replays one scripted event per `recv`. An empty script behaves like a
/// device that never answers.
#[derive(Debug, Default)]
pub struct ScriptedLink {
    pub script: VecDeque<LinkEvent>,
    pub sent: Vec<Vec<u8>>,
    pub opened_with: Option<(String, u16, Duration)>,
    pub fail_open: bool,
    pub open: bool,
    pub open_calls: u32,
    pub close_calls: Rc<Cell<u32>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LinkEvent) {
        self.script.push_back(event);
    }

    pub fn push_reply(&mut self, reply: &[u8]) {
        self.push(LinkEvent::Reply(reply.to_vec()));
    }

    pub fn push_timeouts(&mut self, n: usize) {
        for _ in 0..n {
            self.push(LinkEvent::Fail(io::ErrorKind::WouldBlock));
        }
    }
}

impl DatagramLink for ScriptedLink {
    fn open(&mut self, address: &str, port: u16, timeout: Duration) -> io::Result<()> {
        self.open_calls += 1;
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "socket refused"));
        }
        self.opened_with = Some((address.to_string(), port, timeout));
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if !self.open {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.script.pop_front() {
            Some(LinkEvent::Reply(reply)) => {
                let len = reply.len().min(buf.len());
                buf[..len].copy_from_slice(&reply[..len]);
                Ok(len)
            }
            Some(LinkEvent::Fail(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }

    fn close(&mut self) {
        if self.open {
            self.close_calls.set(self.close_calls.get() + 1);
        }
        self.open = false;
    }
}

// --- Serial channel ---

#[derive(Debug, Clone)]
pub enum SerialEvent {
    Bytes(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Shared view of a scripted serial channel; clones see the same queue.
#[derive(Debug, Clone)]
pub struct SerialScript {
    pub incoming: Arc<Mutex<VecDeque<SerialEvent>>>,
    pub written: Arc<Mutex<Vec<u8>>>,
    pub reads: Arc<Mutex<u32>>,
    /// Channels handed out and not yet dropped.
    pub live: Arc<AtomicUsize>,
    /// How long a read on an empty queue blocks before timing out.
    pub idle_read: Arc<Mutex<Duration>>,
}

impl Default for SerialScript {
    fn default() -> Self {
        SerialScript {
            incoming: Arc::default(),
            written: Arc::default(),
            reads: Arc::default(),
            live: Arc::default(),
            idle_read: Arc::new(Mutex::new(Duration::from_millis(2))),
        }
    }
}

impl SerialScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: &str) {
        self.incoming.lock().unwrap().push_back(SerialEvent::Bytes(line.as_bytes().to_vec()));
    }

    pub fn push_bytes(&self, bytes: &[u8]) {
        self.incoming.lock().unwrap().push_back(SerialEvent::Bytes(bytes.to_vec()));
    }

    pub fn push_fail(&self, kind: io::ErrorKind) {
        self.incoming.lock().unwrap().push_back(SerialEvent::Fail(kind));
    }

    pub fn set_idle_read(&self, idle: Duration) {
        *self.idle_read.lock().unwrap() = idle;
    }

    pub fn pending(&self) -> usize {
        self.incoming.lock().unwrap().len()
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    /// Reads that have already taken their event (or found the queue empty).
    pub fn read_calls(&self) -> u32 {
        *self.reads.lock().unwrap()
    }

    pub fn live_channels(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn channel(&self) -> ScriptedSerial {
        self.live.fetch_add(1, Ordering::SeqCst);
        ScriptedSerial { script: self.clone() }
    }
}

/// Serial channel fed from a [`SerialScript`]. An empty queue blocks for the
/// script's idle time and then times out, like a quiet line.
#[derive(Debug)]
pub struct ScriptedSerial {
    script: SerialScript,
}

impl Read for ScriptedSerial {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let event = self.script.incoming.lock().unwrap().pop_front();
        *self.script.reads.lock().unwrap() += 1;
        match event {
            Some(SerialEvent::Bytes(mut bytes)) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                if len < bytes.len() {
                    let rest = bytes.split_off(len);
                    self.script.incoming.lock().unwrap().push_front(SerialEvent::Bytes(rest));
                }
                Ok(len)
            }
            Some(SerialEvent::Fail(kind)) => Err(io::Error::from(kind)),
            None => {
                let idle = *self.script.idle_read.lock().unwrap();
                std::thread::sleep(idle);
                Err(io::Error::from(io::ErrorKind::TimedOut))
            }
        }
    }
}

impl Write for ScriptedSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.script.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedSerial {
    fn drop(&mut self) {
        self.script.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hands out channels on the shared script and records every `open`.
///
/// With `exclusive` set it refuses to open while another channel is live,
/// like a serial port opened in exclusive mode.
#[derive(Debug, Default)]
pub struct ScriptedOpener {
    pub script: SerialScript,
    pub opened: Mutex<Vec<(String, u32, Duration)>>,
    pub fail_open: bool,
    pub exclusive: bool,
}

impl ScriptedOpener {
    pub fn new(script: SerialScript) -> Self {
        ScriptedOpener { script, ..Default::default() }
    }

    pub fn exclusive(script: SerialScript) -> Self {
        ScriptedOpener { script, exclusive: true, ..Default::default() }
    }

    pub fn open_calls(&self) -> usize {
        self.opened.lock().unwrap().len()
    }
}

impl SerialOpener for ScriptedOpener {
    fn open(&self, path: &str, baud_rate: u32, timeout: Duration) -> io::Result<Box<dyn SerialChannel>> {
        self.opened.lock().unwrap().push((path.to_string(), baud_rate, timeout));
        if self.fail_open {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        if self.exclusive && self.script.live_channels() > 0 {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "port busy"));
        }
        Ok(Box::new(self.script.channel()))
    }
}
