//! Concurrent command store
//!
//! Producers on any thread push commands through a lock-free channel;
//! the render thread owns the live list and drains the channel at
//! snapshot time. Nothing here ever blocks: submission is a non-blocking
//! append, and the snapshot-then-mutate pattern (copy before render,
//! prune after) means rendering never iterates a structure that is being
//! appended to.
//!
//! A command submitted mid-frame lands in either this frame's snapshot
//! or the next; both are correct, and no ordering is guaranteed across
//! that boundary.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::command::ShapeCommand;

/// A live store entry: the immutable command plus its age in frames
///
/// Only the render thread touches `age`, so no atomicity is needed
/// beyond what the channel already provides for the hand-off.
#[derive(Debug, Clone)]
pub struct LiveCommand {
    /// The submitted command, shared with snapshots
    pub command: Arc<ShapeCommand>,

    /// Rendered frames since submission (persistent commands stay at 0)
    pub age: u32,
}

/// Cheap clonable handle producers use to submit commands
#[derive(Debug, Clone)]
pub struct CommandSender {
    sender: Sender<Arc<ShapeCommand>>,
}

impl CommandSender {
    /// Append a command; never blocks
    ///
    /// Fire-and-forget: if the owning store has been torn down the
    /// command is dropped, which only happens during shutdown.
    pub fn submit(&self, command: ShapeCommand) {
        if self.sender.send(Arc::new(command)).is_err() {
            log::debug!("command store gone, dropping submission");
        }
    }
}

/// Append-only collection of live commands with age bookkeeping
///
/// Owned by the render thread. Producers interact only through
/// [`CommandSender`] handles.
pub struct CommandStore {
    sender: Sender<Arc<ShapeCommand>>,
    receiver: Receiver<Arc<ShapeCommand>>,
    live: Vec<LiveCommand>,
}

impl Default for CommandStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            live: Vec::new(),
        }
    }

    /// Create a new producer handle
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Submit directly from the owning thread
    pub fn submit(&self, command: ShapeCommand) {
        self.sender().submit(command);
    }

    /// Move queued submissions into the live list
    fn drain(&mut self) {
        while let Ok(command) = self.receiver.try_recv() {
            self.live.push(LiveCommand { command, age: 0 });
        }
    }

    /// Stable copy of the currently live, non-expired commands
    ///
    /// Entries share their command payload through `Arc`, so the copy is
    /// O(n) pointer clones. Called once per frame by the render pipeline;
    /// rendering then works exclusively off the returned snapshot.
    pub fn snapshot_live(&mut self) -> Vec<LiveCommand> {
        self.drain();
        self.live
            .iter()
            .filter(|entry| !entry.command.lifetime.is_expired(entry.age))
            .cloned()
            .collect()
    }

    /// Advance the age of every live non-persistent command by one frame
    pub fn age_live(&mut self) {
        for entry in &mut self.live {
            if !entry.command.lifetime.is_persistent() {
                entry.age += 1;
            }
        }
    }

    /// Remove entries whose age has reached their lifetime
    pub fn prune_expired(&mut self) {
        self.live
            .retain(|entry| !entry.command.lifetime.is_expired(entry.age));
    }

    /// Remove every live and queued command immediately
    pub fn clear_all(&mut self) {
        self.live.clear();
        while self.receiver.try_recv().is_ok() {}
    }

    /// Number of live commands, including any queued submissions
    pub fn live_count(&mut self) -> usize {
        self.drain();
        self.live.len()
    }
}
