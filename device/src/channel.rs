// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use signer_proto::ByteChannel;

/// In-memory channel errors
#[derive(Copy, Clone, PartialEq, Debug, thiserror::Error)]
pub enum ChannelError {
    /// Channel closed (locally or by the peer)
    #[error("channel closed")]
    Closed,
}

/// In-memory [ByteChannel], created in connected pairs
pub struct MemoryChannel {
    tx: Option<Sender<Vec<u8>>>,
    rx: Receiver<Vec<u8>>,
}

impl MemoryChannel {
    /// Create a connected channel pair
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();

        (
            Self {
                tx: Some(a_tx),
                rx: b_rx,
            },
            Self {
                tx: Some(b_tx),
                rx: a_rx,
            },
        )
    }
}

impl ByteChannel for MemoryChannel {
    type Error = ChannelError;

    fn read(&mut self) -> Result<Option<Vec<u8>>, ChannelError> {
        if self.tx.is_none() {
            return Err(ChannelError::Closed);
        }

        match self.rx.try_recv() {
            Ok(f) => Ok(Some(f)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ChannelError::Closed),
        }
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), ChannelError> {
        let tx = self.tx.as_ref().ok_or(ChannelError::Closed)?;
        tx.send(frame.to_vec()).map_err(|_| ChannelError::Closed)
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        // Dropping the sender disconnects the peer
        self.tx = None;
        Ok(())
    }
}
