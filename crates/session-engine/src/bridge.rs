//! Host bridge: typed, fire-and-forget delivery of processor output to
//! the host application.
//!
//! Angle readings and status text may be coalesced or dropped under
//! backpressure. Cues are never dropped.

use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use kneecue_pose_model::event::{Event, HostMessage, SessionStatus};

/// Default queue depth for angle and status updates.
pub const DEFAULT_UPDATE_CAPACITY: usize = 64;

/// Outbound channel to the host.
pub trait HostBridge: Send + Sync {
    /// Deliver one message. Never blocks on the host and never fails.
    fn send(&self, message: HostMessage);

    /// Map a processor event to its host message and deliver it.
    fn publish(&self, event: &Event) {
        self.send(HostMessage::from(event));
    }

    /// Report a session lifecycle status.
    fn report(&self, status: &SessionStatus) {
        self.send(HostMessage::from(status));
    }
}

/// Bridge over tokio channels.
///
/// Updates go through a bounded queue with `try_send`; a full queue drops
/// the update and counts it. Cues use a separate unbounded queue and are
/// delivered ahead of pending updates.
pub struct ChannelBridge {
    updates: mpsc::Sender<HostMessage>,
    cues: mpsc::UnboundedSender<HostMessage>,
    last_status: Mutex<Option<String>>,
    dropped: AtomicU64,
}

impl ChannelBridge {
    /// Create a bridge and the inbox the host reads from.
    pub fn new(capacity: usize) -> (Self, HostInbox) {
        let (updates_tx, updates_rx) = mpsc::channel(capacity.max(1));
        let (cues_tx, cues_rx) = mpsc::unbounded_channel();

        let bridge = Self {
            updates: updates_tx,
            cues: cues_tx,
            last_status: Mutex::new(None),
            dropped: AtomicU64::new(0),
        };
        let inbox = HostInbox {
            updates: updates_rx,
            cues: cues_rx,
        };
        (bridge, inbox)
    }

    /// Number of updates dropped because the host fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Record `text` as the current status. Returns false if it repeats
    /// the status the host already has.
    fn note_status(&self, text: &str) -> bool {
        let Ok(mut last) = self.last_status.lock() else {
            return true;
        };
        if last.as_deref() == Some(text) {
            return false;
        }
        *last = Some(text.to_string());
        true
    }

    fn forget_status(&self) {
        if let Ok(mut last) = self.last_status.lock() {
            *last = None;
        }
    }
}

impl HostBridge for ChannelBridge {
    fn send(&self, message: HostMessage) {
        if !message.is_droppable() {
            if self.cues.send(message).is_err() {
                tracing::warn!("Host inbox closed; cue not delivered");
            }
            return;
        }

        let is_status = matches!(message, HostMessage::Status { .. });
        if let HostMessage::Status { text } = &message {
            if !self.note_status(text) {
                return;
            }
        }

        match self.updates.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                if is_status {
                    // The host never saw it, so a repeat must go through.
                    self.forget_status();
                }
                tracing::trace!(kind = message.kind(), "Host update dropped");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!("Host inbox closed; update discarded");
            }
        }
    }
}

/// Receiving side of a [`ChannelBridge`].
pub struct HostInbox {
    updates: mpsc::Receiver<HostMessage>,
    cues: mpsc::UnboundedReceiver<HostMessage>,
}

impl HostInbox {
    /// Wait for the next message, cues first. `None` once the bridge is
    /// dropped and both queues are drained.
    pub async fn recv(&mut self) -> Option<HostMessage> {
        tokio::select! {
            biased;
            Some(cue) = self.cues.recv() => Some(cue),
            Some(update) = self.updates.recv() => Some(update),
            else => None,
        }
    }

    /// Take the next message if one is ready, cues first.
    pub fn try_recv(&mut self) -> Option<HostMessage> {
        self.cues
            .try_recv()
            .ok()
            .or_else(|| self.updates.try_recv().ok())
    }

    /// Take everything currently queued.
    pub fn drain(&mut self) -> Vec<HostMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Bridge that writes one JSON message per line.
pub struct JsonlBridge<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
    written: AtomicU64,
}

impl<W: Write + Send> JsonlBridge<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            written: AtomicU64::new(0),
        }
    }

    /// Number of messages written.
    pub fn messages_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Flush buffered lines.
    pub fn flush(&self) -> io::Result<()> {
        match self.writer.lock() {
            Ok(mut writer) => writer.flush(),
            Err(_) => Err(io::Error::other("host writer lock poisoned")),
        }
    }

    fn write_line(&self, message: &HostMessage) -> io::Result<()> {
        let json = serde_json::to_string(message)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("host writer lock poisoned"))?;
        writeln!(writer, "{json}")?;

        // Angles are high-rate; status and cue lines go out immediately.
        if !matches!(message, HostMessage::PoseAngle { .. }) {
            writer.flush()?;
        }
        Ok(())
    }
}

impl JsonlBridge<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> HostBridge for JsonlBridge<W> {
    fn send(&self, message: HostMessage) {
        match self.write_line(&message) {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!(error = %e, kind = message.kind(), "Failed to write host message"),
        }
    }
}

/// Bridge that keeps every message in memory.
#[derive(Default)]
pub struct MemoryBridge {
    messages: Mutex<Vec<HostMessage>>,
}

impl MemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far, in order.
    pub fn messages(&self) -> Vec<HostMessage> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Status texts in order.
    pub fn statuses(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                HostMessage::Status { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Angle readings in order.
    pub fn angles(&self) -> Vec<f64> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                HostMessage::PoseAngle { angle } => Some(angle),
                _ => None,
            })
            .collect()
    }

    /// Cue texts in order.
    pub fn cues(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                HostMessage::Cue { text } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl HostBridge for MemoryBridge {
    fn send(&self, message: HostMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_bridge_never_drops_cues() {
        let (bridge, mut inbox) = ChannelBridge::new(2);

        for i in 0..10 {
            bridge.publish(&Event::angle(100.0 + i as f64));
        }
        for _ in 0..5 {
            bridge.publish(&Event::cue("straighten your knees"));
        }

        assert_eq!(bridge.dropped(), 8);

        let messages = inbox.drain();
        let cues = messages
            .iter()
            .filter(|m| matches!(m, HostMessage::Cue { .. }))
            .count();
        assert_eq!(cues, 5);
        assert_eq!(messages.len(), 7);
        // Cues come out ahead of queued updates.
        assert_eq!(messages[0].kind(), "CUE");
    }

    #[tokio::test]
    async fn test_channel_bridge_suppresses_repeated_status() {
        let (bridge, mut inbox) = ChannelBridge::new(16);
        bridge.publish(&Event::NoPoseDetected);
        bridge.publish(&Event::NoPoseDetected);
        bridge.publish(&Event::NoPoseDetected);
        bridge.publish(&Event::JointsUnreliable);
        bridge.publish(&Event::NoPoseDetected);

        let statuses: Vec<HostMessage> = inbox.drain();
        assert_eq!(
            statuses,
            vec![
                HostMessage::status("no pose detected"),
                HostMessage::status("joints unreliable"),
                HostMessage::status("no pose detected"),
            ]
        );
    }

    #[tokio::test]
    async fn test_dropped_status_is_not_suppressed_later() {
        let (bridge, mut inbox) = ChannelBridge::new(1);
        bridge.publish(&Event::angle(120.0));
        bridge.publish(&Event::NoPoseDetected);
        assert_eq!(bridge.dropped(), 1);

        inbox.drain();
        bridge.publish(&Event::NoPoseDetected);
        assert_eq!(inbox.drain(), vec![HostMessage::status("no pose detected")]);
    }

    #[tokio::test]
    async fn test_inbox_recv_ends_when_bridge_dropped() {
        let (bridge, mut inbox) = ChannelBridge::new(4);
        bridge.report(&SessionStatus::Running);
        drop(bridge);

        assert_eq!(inbox.recv().await, Some(HostMessage::status("running")));
        assert_eq!(inbox.recv().await, None);
    }

    #[test]
    fn test_jsonl_bridge_writes_one_message_per_line() {
        let bridge = JsonlBridge::new(Vec::new());
        bridge.report(&SessionStatus::Starting);
        bridge.publish(&Event::angle(95.5));
        bridge.publish(&Event::cue("straighten your knees"));
        bridge.flush().unwrap();
        assert_eq!(bridge.messages_written(), 3);

        let buffer = bridge.writer.into_inner().unwrap().into_inner().unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#"{"type":"STATUS","text":"starting"}"#);
        assert_eq!(lines[1], r#"{"type":"POSE_ANGLE","angle":95.5}"#);
        assert_eq!(lines[2], r#"{"type":"CUE","text":"straighten your knees"}"#);
    }

    #[test]
    fn test_memory_bridge_filters() {
        let bridge = MemoryBridge::new();
        bridge.publish(&Event::angle(80.0));
        bridge.publish(&Event::cue("go"));
        bridge.publish(&Event::NoPoseDetected);

        assert_eq!(bridge.len(), 3);
        assert_eq!(bridge.angles(), vec![80.0]);
        assert_eq!(bridge.cues(), vec!["go".to_string()]);
        assert_eq!(bridge.statuses(), vec!["no pose detected".to_string()]);

        bridge.clear();
        assert!(bridge.is_empty());
    }
}
