use std::collections::HashMap;

use parking_lot::RwLock;
use sp_net::{encode_frame, Frame, Role};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::NodeError;

/// An in-process stand-in for a real peer-to-peer socket transport: every
/// registered role gets an unbounded channel, and `send_to`/`broadcast_except`
/// encode a [`Frame`] and post the bytes to one or all inboxes. A real
/// deployment would swap this for a socket layer speaking the same framing.
#[derive(Default)]
pub struct Bus {
    inboxes: RwLock<HashMap<Role, UnboundedSender<Vec<u8>>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `role` on the bus, returning the receiving half of its inbox.
    pub fn subscribe(&self, role: Role) -> UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inboxes.write().insert(role, tx);
        rx
    }

    /// Encode `frame` and post it to the single role's inbox.
    pub fn send_to(&self, role: Role, frame: &Frame) -> Result<(), NodeError> {
        let bytes = encode_frame(frame)?;
        let inboxes = self.inboxes.read();
        let sender = inboxes.get(&role).ok_or(NodeError::NoSubscriber(role))?;
        // A peer that has already shut down is not this caller's problem.
        let _ = sender.send(bytes);
        Ok(())
    }

    /// Encode `frame` and post it to every subscribed role other than `except`.
    pub fn broadcast_except(&self, except: Role, frame: &Frame) -> Result<(), NodeError> {
        let bytes = encode_frame(frame)?;
        for (role, sender) in self.inboxes.read().iter() {
            if *role != except {
                let _ = sender.send(bytes.clone());
            }
        }
        Ok(())
    }
}
