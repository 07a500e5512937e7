//! Call-stack capture and the types frames are made of.
//!
//! The collector never walks the native stack. Hosts describe the frames they
//! care about (request handlers, jobs, template renders) on a [`CallStack`],
//! or plug in their own [`StackTraceProvider`].

pub mod serializer;

use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

pub use serializer::{JsonSerializer, Serializer};

/// A message-builder value that can describe itself for the record.
pub trait Mailable: Send + Sync {
    /// Snapshot of the mailable for `data.mailable`.
    fn to_value(&self) -> serde_json::Result<Value>;
}

/// The object a frame was executing on.
pub trait FrameReceiver: Send + Sync {
    /// Type name shown in traces.
    fn type_name(&self) -> &str;

    /// Capability check: `Some` when the receiver is a mailable.
    fn as_mailable(&self) -> Option<&dyn Mailable> {
        None
    }
}

/// A raw call-stack frame.
#[derive(Clone, Default)]
pub struct StackFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    /// Template path when the frame renders a view.
    pub view: Option<String>,
    pub receiver: Option<Arc<dyn FrameReceiver>>,
}

impl StackFrame {
    /// Frame at an explicit location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            ..Default::default()
        }
    }

    /// Frame at the caller's source location.
    #[track_caller]
    pub fn here(function: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            file: Some(location.file().to_string()),
            line: Some(location.line()),
            function: Some(function.into()),
            ..Default::default()
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_receiver(mut self, receiver: Arc<dyn FrameReceiver>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// The frame's receiver, if it is a mailable.
    pub fn mailable(&self) -> Option<&dyn Mailable> {
        self.receiver.as_deref().and_then(|r| r.as_mailable())
    }
}

impl fmt::Debug for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackFrame")
            .field("file", &self.file)
            .field("line", &self.line)
            .field("function", &self.function)
            .field("view", &self.view)
            .field("receiver", &self.receiver.as_ref().map(|r| r.type_name()))
            .finish()
    }
}

/// Source of call stacks for captured records.
pub trait StackTraceProvider: Send + Sync {
    /// Current stack, innermost frame first.
    fn capture(&self) -> Vec<StackFrame>;

    /// Point template-render frames at their template instead of the
    /// generated code that rendered them.
    fn resolve_view_names(&self, trace: Vec<StackFrame>) -> Vec<StackFrame> {
        trace
            .into_iter()
            .map(|mut frame| {
                if let Some(view) = &frame.view {
                    frame.file = Some(view.clone());
                }
                frame
            })
            .collect()
    }

    /// First frame satisfying `predicate`, scanning innermost first.
    fn first_matching<'t>(
        &self,
        trace: &'t [StackFrame],
        predicate: &dyn Fn(&StackFrame) -> bool,
    ) -> Option<&'t StackFrame> {
        trace.iter().find(|frame| predicate(frame))
    }
}

/// Explicit frame stack owned by one unit of work.
///
/// Frames are pushed with [`CallStack::enter`] and popped when the returned
/// guard drops.
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Mutex<Vec<StackFrame>>,
}

impl CallStack {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Push a frame; it stays on the stack until the guard is dropped.
    pub fn enter(&self, frame: StackFrame) -> FrameGuard<'_> {
        let mut frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        let depth = frames.len();
        frames.push(frame);
        FrameGuard { stack: self, depth }
    }

    /// Number of frames currently entered.
    pub fn depth(&self) -> usize {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl StackTraceProvider for CallStack {
    fn capture(&self) -> Vec<StackFrame> {
        let frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        frames.iter().rev().cloned().collect()
    }
}

/// Pops its frame (and anything entered after it) on drop.
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard<'a> {
    stack: &'a CallStack,
    depth: usize,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .truncate(self.depth);
    }
}
