//! Command buffer between the outer layers and the simulation
//!
//! Uses crossbeam-channel for lock-free MPSC submission from whatever
//! drives the worms (network handlers, bots, tests). The session drains
//! everything pending between two ticks, so a tick never observes a
//! half-applied command.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::game::constants::session::COMMAND_BUFFER_CAPACITY;
use crate::game::state::Slot;
use crate::util::vec2::Vec2;

/// Held state of a worm's control keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub rope: bool,
}

impl Controls {
    #[inline]
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Administrative and control input for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Join { name: String, color_index: u8 },
    Leave { slot: Slot },
    Kick { slot: Slot, reason: Option<String> },
    Controls { slot: Slot, controls: Controls, aim: Vec2 },
    SelectWeapon { slot: Slot, index: usize },
    RotateWeapon { slot: Slot, by: i32 },
    /// Pauses an unpaused game or resumes a paused one
    TogglePause { slot: Slot },
}

impl Command {
    /// Slot the command targets, when it targets one
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Command::Join { .. } => None,
            Command::Leave { slot }
            | Command::Kick { slot, .. }
            | Command::Controls { slot, .. }
            | Command::SelectWeapon { slot, .. }
            | Command::RotateWeapon { slot, .. }
            | Command::TogglePause { slot } => Some(*slot),
        }
    }
}

/// Bounded command queue drained once per tick
pub struct CommandBuffer {
    sender: Sender<Command>,
    receiver: Receiver<Command>,
    capacity: usize,
}

impl CommandBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Clonable submission handle
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Drain all pending commands in submission order
    pub fn drain(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(COMMAND_BUFFER_CAPACITY)
    }
}

#[derive(Clone)]
pub struct CommandSender {
    sender: Sender<Command>,
}

impl CommandSender {
    /// Submit a command without blocking
    pub fn try_send(&self, command: Command) -> Result<(), InputError> {
        self.sender.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => InputError::Full,
            TrySendError::Disconnected(_) => InputError::Disconnected,
        })
    }
}

/// Errors raised at the input edge of the simulation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Command buffer is full")]
    Full,
    #[error("Command buffer disconnected")]
    Disconnected,
    #[error("Slot {0} is not occupied")]
    EmptySlot(Slot),
    #[error("Slot {0} does not exist")]
    UnknownSlot(Slot),
}
