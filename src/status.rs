//! Status byte decoding.
//!
//! The printer answers `DLE EOT n` with a single byte whose bits carry the
//! state flags. These types turn that byte into something Rust friendly.

use bitflags::bitflags;

bitflags! {
    /// Raw bits of the reply to `DLE EOT 3`.
    pub struct ErrorStatus: u8 {
        const MECHANICAL = 0b0000_0100;
        const AUTOCUTTER = 0b0000_1000;
        const UNRECOVERABLE = 0b0010_0000;
        const AUTORECOVERABLE = 0b0100_0000;
    }
}

bitflags! {
    /// Raw bits of the reply to `DLE EOT 5`.
    pub struct TicketStatus: u8 {
        /// Set while the ticket is still in the presenter.
        const TICKET_PRESENT = 0b0000_0100;
    }
}

/// Error state reported by the printer.
///
/// A non-clear value is returned to the caller as [`crate::Error::Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorInfo {
    pub mechanical_error: bool,
    pub autocutter_error: bool,
    pub unrecoverable_error: bool,
    pub autorecoverable_error: bool,
}

impl ErrorInfo {
    /// Decode the reply byte of the error status query.
    ///
    /// Bits that carry no error flag are ignored.
    pub fn from_status(byte: u8) -> Self {
        let bits = ErrorStatus::from_bits_truncate(byte);
        ErrorInfo {
            mechanical_error: bits.contains(ErrorStatus::MECHANICAL),
            autocutter_error: bits.contains(ErrorStatus::AUTOCUTTER),
            unrecoverable_error: bits.contains(ErrorStatus::UNRECOVERABLE),
            autorecoverable_error: bits.contains(ErrorStatus::AUTORECOVERABLE),
        }
    }

    /// `true` when no error flag is set.
    pub fn is_ok(&self) -> bool {
        !(self.mechanical_error
            || self.autocutter_error
            || self.unrecoverable_error
            || self.autorecoverable_error)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.mechanical_error {
            write!(f, "mechanical error")?;
        } else if self.autocutter_error {
            write!(f, "autocutter error")?;
        } else {
            write!(f, "printer error")?;
        }

        if self.unrecoverable_error {
            write!(f, " (unrecoverable)")
        } else if self.autorecoverable_error {
            write!(f, " (recoverable)")
        } else {
            Ok(())
        }
    }
}

impl std::error::Error for ErrorInfo {}

/// Ticket presenter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TicketInfo {
    pub ticket_taken: bool,
}

impl TicketInfo {
    /// Decode the reply byte of the ticket status query.
    pub fn from_status(byte: u8) -> Self {
        let bits = TicketStatus::from_bits_truncate(byte);
        TicketInfo {
            ticket_taken: !bits.contains(TicketStatus::TICKET_PRESENT),
        }
    }
}
