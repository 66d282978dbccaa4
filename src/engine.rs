//! High-level engine API
//!
//! Owns the audio graph and hands out message handles. One `process()` call
//! advances the whole graph by one 64-sample block; the caller (or the cpal
//! sink's ring buffer) is responsible for pacing blocks against wall time.

use core::marker::PhantomData;

#[cfg(feature = "cpal_io")]
use tracing::debug;

use crate::graph::AudioGraph;
use crate::node::{AudioNode, NodeId};
use crate::physics::ConfigError;

#[cfg(feature = "cpal_io")]
use crate::device::CpalDevice;

/// Handle for sending messages to a node
pub struct Handle<M: Send + 'static> {
    pub(crate) node_id: NodeId,
    pub(crate) sender: rtrb::Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> Handle<M> {
    /// Send a message to the node (applied at the start of the next block).
    ///
    /// Returns the message back if the queue is full.
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(m)| m)
    }

    pub fn id(&self) -> NodeId {
        self.node_id
    }
}

/// The main engine: an audio graph plus the output sink.
pub struct Schwingt {
    graph: AudioGraph,
    sample_rate: u32,
    sink_node: Option<NodeId>,
    blocks_processed: u64,
}

impl Schwingt {
    /// Create a new engine with an explicit sample rate.
    ///
    /// Use `with_output()` to set the output sink. A zero sample rate is a
    /// configuration error, not something to discover mid-stream.
    pub fn new(sample_rate: u32) -> Result<Self, ConfigError> {
        if sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(Self {
            graph: AudioGraph::new(sample_rate),
            sample_rate,
            sink_node: None,
            blocks_processed: 0,
        })
    }

    /// Create an engine wired to the default audio output device.
    #[cfg(feature = "cpal_io")]
    pub fn default_output() -> Option<Self> {
        let device = CpalDevice::default_output()?;
        let sample_rate = device.sample_rate();
        debug!(device = device.name(), sample_rate, "using default output");

        let mut engine = Self::new(sample_rate).ok()?;
        let sink = device.create_sink();
        let handle = engine.graph.add(sink);
        engine.sink_node = Some(handle.id());
        engine.graph.set_terminal(handle.id());
        Some(engine)
    }

    /// Add a custom output sink.
    pub fn with_output<S: AudioNode<Message = ()>>(mut self, sink: S) -> Self {
        let handle = self.graph.add(sink);
        self.sink_node = Some(handle.id());
        self.graph.set_terminal(handle.id());
        self
    }

    /// Get the output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of blocks processed so far.
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }

    /// Add a node to the graph
    pub fn add<N: AudioNode>(&mut self, node: N) -> Handle<N::Message> {
        let handle = self.graph.add(node);
        Handle {
            node_id: handle.id(),
            sender: handle.sender,
            _marker: PhantomData,
        }
    }

    /// Connect two nodes
    pub fn connect<M1, M2>(&mut self, from: &Handle<M1>, to: &Handle<M2>)
    where
        M1: Send + 'static,
        M2: Send + 'static,
    {
        self.graph.connect(from.node_id, to.node_id);
    }

    /// Connect a node to the output sink.
    ///
    /// Panics if no sink has been configured; wiring is a setup-time concern.
    pub fn output<M: Send + 'static>(&mut self, handle: &Handle<M>) {
        let sink_id = self
            .sink_node
            .expect("no output sink configured; use default_output() or with_output()");
        self.graph.connect(handle.node_id, sink_id);
    }

    /// Process one block of audio
    pub fn process(&mut self) {
        self.graph.process();
        self.blocks_processed += 1;
    }
}
