// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Byte channel abstraction for host / device communication
//!
//! Physical transports (USB HID, serial, pipes) implement [ByteChannel],
//! delivering whole message frames as produced by [to_frame][crate::to_frame].

use core::fmt::{Debug, Display};

/// Bidirectional frame-oriented channel with session bracketing
pub trait ByteChannel {
    type Error: Debug + Display;

    /// Begin a session (exclusive use of the channel)
    fn session_begin(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// End a session
    fn session_end(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Poll for an incoming frame, returning `None` if nothing is pending
    fn read(&mut self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Write a single frame
    fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Close the channel, called once on shutdown
    fn close(&mut self) -> Result<(), Self::Error>;
}

impl<T: ByteChannel> ByteChannel for &mut T {
    type Error = T::Error;

    fn session_begin(&mut self) -> Result<(), Self::Error> {
        T::session_begin(self)
    }

    fn session_end(&mut self) -> Result<(), Self::Error> {
        T::session_end(self)
    }

    fn read(&mut self) -> Result<Option<Vec<u8>>, Self::Error> {
        T::read(self)
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        T::write(self, frame)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        T::close(self)
    }
}
