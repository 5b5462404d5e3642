//! Output sinks: where reconciled events go.
//!
//! A sink owns transport framing. The session loop calls [`EventSink::send`]
//! synchronously and in order, so a slow sink slows fragment consumption
//! rather than reordering output.

use std::io::Write;

use tokio::sync::mpsc;

use crate::error::{FlowError, Result};
use crate::types::{DeltaCategory, SinkEvent};

/// Consumer of control and content-delta events for one session.
pub trait EventSink: Send {
    /// Hand one event to the transport. An error means the receiving side
    /// is gone; the session stops.
    fn send(&mut self, event: SinkEvent) -> Result<()>;
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn send(&mut self, event: SinkEvent) -> Result<()> {
        (**self).send(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn send(&mut self, event: SinkEvent) -> Result<()> {
        (**self).send(event)
    }
}

/// Records every event in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    events: Vec<SinkEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }

    /// Concatenated chat deltas.
    pub fn chat(&self) -> String {
        self.concat(DeltaCategory::Chat)
    }

    /// Concatenated reasoning deltas.
    pub fn reasoning(&self) -> String {
        self.concat(DeltaCategory::Reasoning)
    }

    fn concat(&self, category: DeltaCategory) -> String {
        self.events
            .iter()
            .filter_map(|event| event.delta_content(category))
            .collect()
    }
}

impl EventSink for CollectingSink {
    fn send(&mut self, event: SinkEvent) -> Result<()> {
        self.events.push(event);
        Ok(())
    }
}

/// Forwards events into an unbounded channel, typically read by the task
/// serving the client connection.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<SinkEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn send(&mut self, event: SinkEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| FlowError::Sink("receiver dropped".to_string()))
    }
}

/// Frames events as Server-Sent Events on any writer.
///
/// Control events go out as `event: control`, content deltas as
/// `event: delta`, each with a single JSON `data:` line.
#[derive(Debug)]
pub struct SseSink<W> {
    writer: W,
}

impl<W: Write + Send> SseSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Render one event as an SSE frame.
pub fn sse_frame(event: &SinkEvent) -> Result<String> {
    let name = match event {
        SinkEvent::Control(_) => "control",
        SinkEvent::Delta(_) => "delta",
    };
    let data = serde_json::to_string(event)?;
    Ok(format!("event: {name}\ndata: {data}\n\n"))
}

impl<W: Write + Send> EventSink for SseSink<W> {
    fn send(&mut self, event: SinkEvent) -> Result<()> {
        let frame = sse_frame(&event)?;
        self.writer
            .write_all(frame.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| FlowError::Sink(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentDelta, ControlEvent};

    fn delta(id: u64, category: DeltaCategory, content: &str) -> SinkEvent {
        SinkEvent::Delta(ContentDelta {
            id,
            category,
            content: content.to_string(),
            model: "m".to_string(),
        })
    }

    #[test]
    fn collecting_sink_splits_channels() {
        let mut sink = CollectingSink::new();
        sink.send(SinkEvent::Control(ControlEvent::thinking())).unwrap();
        sink.send(delta(0, DeltaCategory::Reasoning, "hm")).unwrap();
        sink.send(delta(1, DeltaCategory::Chat, "Hi")).unwrap();
        sink.send(delta(2, DeltaCategory::Chat, "!")).unwrap();

        assert_eq!(sink.events().len(), 4);
        assert_eq!(sink.chat(), "Hi!");
        assert_eq!(sink.reasoning(), "hm");
    }

    #[test]
    fn channel_sink_fails_once_receiver_is_gone() {
        let (mut sink, rx) = ChannelSink::channel();
        sink.send(SinkEvent::Control(ControlEvent::thinking())).unwrap();
        drop(rx);
        let err = sink
            .send(SinkEvent::Control(ControlEvent::thinking()))
            .unwrap_err();
        assert!(matches!(err, FlowError::Sink(_)));
    }

    #[test]
    fn sse_sink_writes_named_frames() {
        let mut sink = SseSink::new(Vec::new());
        sink.send(SinkEvent::Control(ControlEvent::thinking())).unwrap();
        sink.send(delta(0, DeltaCategory::Chat, "Hi")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "event: control\ndata: {\"type\":\"thinking\"}\n\n\
             event: delta\ndata: {\"id\":0,\"category\":\"chat\",\"content\":\"Hi\",\"model\":\"m\"}\n\n"
        );
    }
}
