use image::DynamicImage;
use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{
    command::{self, Justification, PrintMode},
    error::Error,
    raster::RasterBitmap,
    status::{ErrorInfo, TicketInfo},
    transport::Transport,
    usb::UsbTransport,
};

/// Size of each write when streaming a raster image.
pub const CHUNK_SIZE: usize = 64;

/// Printer session.
///
/// Owns the transport for its whole lifetime. Status queries hold an
/// exchange lock from the request write until the reply is read, so two
/// threads querying at once never receive each other's reply.
pub struct Printer<T: Transport = UsbTransport> {
    transport: T,
    exchange: Mutex<()>,
    lock_mode: LockMode,
    closed: bool,
}

impl Printer<UsbTransport> {
    /// Open the attached MSD347 over USB.
    pub fn connect(config: Config) -> Result<Self, Error> {
        let transport = UsbTransport::open(&config)?;
        Ok(Printer::new(transport, config))
    }
}

impl<T: Transport> Printer<T> {
    /// Start a session on an already open transport.
    pub fn new(transport: T, config: Config) -> Self {
        info!("printer session opened, {:?}", config);
        Printer {
            transport,
            exchange: Mutex::new(()),
            lock_mode: config.lock_mode,
            closed: false,
        }
    }

    /// Close the session and its transport.
    ///
    /// Every later operation fails with [`Error::Closed`]. Calling `close`
    /// again is passed through to the transport, which may reject it.
    pub fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        info!("closing printer session");
        self.transport.close()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reset the printer to its power-on modes.
    pub fn initialize(&self) -> Result<(), Error> {
        self.send(&command::initialize())
    }

    pub fn set_buttons_enabled(&self, enabled: bool) -> Result<(), Error> {
        self.send(&command::set_buttons_enabled(enabled))
    }

    pub fn set_justification(&self, justification: Justification) -> Result<(), Error> {
        self.send(&command::set_justification(justification))
    }

    pub fn full_cut(&self) -> Result<(), Error> {
        self.send(&command::full_cut())
    }

    /// Dither, pack and print an image.
    ///
    /// Size limits are checked before anything is written.
    pub fn print_image(&self, image: &DynamicImage, mode: PrintMode) -> Result<(), Error> {
        self.ensure_open()?;
        let bitmap = RasterBitmap::from_image(image)?;
        self.print_raster(&bitmap, mode)
    }

    /// Print an already rasterized bitmap.
    ///
    /// The command is streamed in [`CHUNK_SIZE`] writes. If one of them fails
    /// the printer is left mid-image; resend the image or initialize it again.
    pub fn print_raster(&self, bitmap: &RasterBitmap, mode: PrintMode) -> Result<(), Error> {
        self.ensure_open()?;
        let buf = bitmap.to_command(mode);
        debug!(
            "print raster {:?}: {} bytes x {} dots, {} bytes total",
            mode,
            bitmap.width_bytes(),
            bitmap.height(),
            buf.len()
        );

        let _guard = self.command_guard();
        for chunk in buf.chunks(CHUNK_SIZE) {
            self.write(chunk)?;
        }
        Ok(())
    }

    /// Query the error status.
    ///
    /// Returns `Ok(())` when no error flag is set and [`Error::Device`] with
    /// the decoded flags otherwise.
    pub fn query_error(&self) -> Result<(), Error> {
        let byte = self.query(&command::query_error_status(), "query error")?;
        let info = ErrorInfo::from_status(byte);
        debug!("error status {:#04X}: {:?}", byte, info);

        if info.is_ok() {
            Ok(())
        } else {
            warn!("printer reports {}", info);
            Err(Error::Device(info))
        }
    }

    /// Query whether the last ticket was taken from the presenter.
    pub fn ticket_info(&self) -> Result<TicketInfo, Error> {
        let byte = self.query(&command::query_ticket_status(), "ticket info")?;
        let info = TicketInfo::from_status(byte);
        debug!("ticket status {:#04X}: {:?}", byte, info);
        Ok(info)
    }

    fn query(&self, cmd: &[u8], name: &'static str) -> Result<u8, Error> {
        self.ensure_open()?;
        let _guard = self.lock();

        self.write(cmd)?;
        let mut buf = [0x00; 1];
        let n = self.transport.read(&mut buf)?;
        if n < 1 {
            debug!("{}: empty reply", name);
            return Err(Error::ProtocolViolation(name));
        }
        Ok(buf[0])
    }

    fn send(&self, cmd: &[u8]) -> Result<(), Error> {
        self.ensure_open()?;
        let _guard = self.command_guard();
        self.write(cmd)?;
        Ok(())
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        debug!("write {:?}", Preview(buf));
        let n = self.transport.write(buf)?;
        if n == buf.len() {
            Ok(n)
        } else {
            debug!(
                "write error: bytes wrote {} != bytes supplied {}",
                n,
                buf.len()
            );
            Err(Error::IncompleteWrite {
                written: n,
                expected: buf.len(),
            })
        }
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Plain commands only take the exchange lock in exclusive mode.
    fn command_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match self.lock_mode {
            LockMode::Queries => None,
            LockMode::Exclusive => Some(self.lock()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // guards no data, poisoning is harmless
        self.exchange.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Debug view of a write that only shows the first bytes of raster data.
struct Preview<'a>(&'a [u8]);

impl std::fmt::Debug for Preview<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const SHOWN: usize = 8;
        if self.0.len() > SHOWN {
            write!(f, "{:X?}.. ({} bytes)", &self.0[..SHOWN], self.0.len())
        } else {
            write!(f, "{:X?}", self.0)
        }
    }
}

/// Which operations share the exchange lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Only status queries are serialized. Plain commands may interleave
    /// with a query's request and reply.
    Queries,
    /// Every command and query holds the lock for its whole write sequence.
    Exclusive,
}

impl Default for LockMode {
    fn default() -> Self {
        Self::Queries
    }
}

/// Session and USB settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) timeout: Duration,
    lock_mode: LockMode,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// USB transfers block without a deadline and only status queries are
    /// serialized.
    ///
    /// # Example
    ///
    /// ```
    /// use msd347::{Config, LockMode};
    /// use std::time::Duration;
    ///
    /// let config = Config::new()
    ///     .timeout(Duration::from_secs(5))
    ///     .lock_mode(LockMode::Exclusive);
    /// ```
    ///
    pub fn new() -> Config {
        Config {
            timeout: Duration::ZERO,
            lock_mode: LockMode::Queries,
        }
    }

    /// USB bulk transfer timeout. `Duration::ZERO` waits forever.
    pub fn timeout(self, timeout: Duration) -> Self {
        Config { timeout, ..self }
    }

    pub fn lock_mode(self, lock_mode: LockMode) -> Self {
        Config { lock_mode, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
