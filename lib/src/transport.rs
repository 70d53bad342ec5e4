// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Host transports
//!
//! A [Transport] carries whole message frames to and from a device.
//! [EmuTransport] runs the device core in-process on a dedicated thread,
//! connected via a [MemoryChannel][signer_device::MemoryChannel] pair.

use std::time::Duration;

use async_trait::async_trait;

use crate::Error;

/// Frame transport to a signing device
#[async_trait]
pub trait Transport: Send {
    /// Begin an exclusive session
    async fn session_begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// End a session
    async fn session_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Write a single frame
    async fn write(&mut self, frame: &[u8]) -> Result<(), Error>;

    /// Read a single frame, failing with [Error::RequestTimeout] after `timeout`
    async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, Error>;
}

#[cfg(feature = "emu")]
pub use emu::EmuTransport;

#[cfg(feature = "emu")]
mod emu {
    use std::{
        any::Any,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread::{self, JoinHandle},
        time::Duration,
    };

    use async_trait::async_trait;
    use log::{debug, error};
    use rand_core::{CryptoRng, RngCore};

    use signer_core::{
        engine::{Driver, Engine},
        signing::DescriptorCompiler,
    };
    use signer_device::{Buttons, Device, MemoryChannel};
    use signer_proto::ByteChannel;

    use super::Transport;
    use crate::Error;

    /// Host poll period for emulated device responses
    const POLL_PERIOD: Duration = Duration::from_millis(10);

    /// Extract the message from a thread panic payload
    fn panic_message(p: &(dyn Any + Send)) -> &str {
        if let Some(s) = p.downcast_ref::<&str>() {
            s
        } else if let Some(s) = p.downcast_ref::<String>() {
            s.as_str()
        } else {
            "unknown panic"
        }
    }

    /// In-process emulated device transport
    pub struct EmuTransport {
        channel: MemoryChannel,
        exit: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl EmuTransport {
        /// Spawn a device control loop over the provided engine and buttons
        pub fn spawn<DRV, CMP, RNG, BTN>(engine: Engine<DRV, CMP, RNG>, buttons: BTN) -> Self
        where
            DRV: Driver + Send + 'static,
            CMP: DescriptorCompiler + Send + 'static,
            RNG: RngCore + CryptoRng + Send + 'static,
            BTN: Buttons + Send + 'static,
        {
            let (device_ch, host_ch) = MemoryChannel::pair();
            let exit = Arc::new(AtomicBool::new(false));

            let e = exit.clone();
            let handle = thread::spawn(move || {
                let mut d = Device::new(engine, device_ch, buttons);

                match d.run(&e) {
                    Ok(_) => debug!("emulated device exited"),
                    Err(e) => error!("emulated device failed: {}", e),
                }
            });

            Self {
                channel: host_ch,
                exit,
                handle: Some(handle),
            }
        }
    }

    impl Drop for EmuTransport {
        fn drop(&mut self) {
            self.exit.store(true, Ordering::Relaxed);

            if let Some(h) = self.handle.take() {
                if let Err(p) = h.join() {
                    error!("emulated device panicked: {}", panic_message(p.as_ref()));
                }
            }
        }
    }

    #[async_trait]
    impl Transport for EmuTransport {
        async fn write(&mut self, frame: &[u8]) -> Result<(), Error> {
            self.channel
                .write(frame)
                .map_err(|e| Error::Transport(e.to_string()))
        }

        async fn read(&mut self, timeout: Duration) -> Result<Vec<u8>, Error> {
            let channel = &mut self.channel;

            tokio::time::timeout(timeout, async move {
                loop {
                    match channel.read() {
                        Ok(Some(f)) => return Ok(f),
                        Ok(None) => tokio::time::sleep(POLL_PERIOD).await,
                        Err(e) => return Err(Error::Transport(e.to_string())),
                    }
                }
            })
            .await?
        }
    }

}
