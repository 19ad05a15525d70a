//! Command encoding for the MSD347 control protocol.
//!
//! Every function here is pure: it only builds the byte sequence of one
//! command. Writing it to the device is the job of [`crate::Printer`].

pub const ESC: u8 = 0x1B;
pub const GS: u8 = 0x1D;
pub const DLE: u8 = 0x10;
pub const EOT: u8 = 0x04;

/// Device-side scaling applied to a raster print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PrintMode {
    Normal = 0,
    DoubleHeight = 1,
    DoubleWidth = 2,
    Quadruple = 3,
}

impl PrintMode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::DoubleHeight),
            2 => Some(Self::DoubleWidth),
            3 => Some(Self::Quadruple),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Default for PrintMode {
    fn default() -> Self {
        Self::Normal
    }
}

/// Horizontal placement of subsequent text and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Justification {
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Justification {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// ESC @ : Initialize printer
pub fn initialize() -> Vec<u8> {
    vec![ESC, b'@']
}

/// ESC c 5 n : Enable/disable panel buttons (n = 0 enables them)
pub fn set_buttons_enabled(enabled: bool) -> Vec<u8> {
    let n = if enabled { 0 } else { 1 };
    vec![ESC, b'c', b'5', n]
}

/// ESC a n : Select justification
pub fn set_justification(justification: Justification) -> Vec<u8> {
    vec![ESC, b'a', justification.code()]
}

/// ESC i : Full cut
pub fn full_cut() -> Vec<u8> {
    vec![ESC, b'i']
}

/// DLE EOT 3 : Transmit error status
pub fn query_error_status() -> Vec<u8> {
    vec![DLE, EOT, 3]
}

/// DLE EOT 5 : Transmit ticket status
pub fn query_ticket_status() -> Vec<u8> {
    vec![DLE, EOT, 5]
}

/// GS v 0 : Raster image command header.
///
/// The header is followed on the wire by `width_bytes * height` bytes of
/// packed bitmap data. Width is in bytes (8 dots each), height in dots, both
/// little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterHeader {
    pub mode: PrintMode,
    pub width_bytes: u16,
    pub height: u16,
}

impl RasterHeader {
    pub const LEN: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [w_l, w_h] = self.width_bytes.to_le_bytes();
        let [h_l, h_h] = self.height.to_le_bytes();
        [GS, b'v', b'0', self.mode.code(), w_l, w_h, h_l, h_h]
    }

    /// Parse a header from the start of `buf`.
    ///
    /// Returns `None` if the selector bytes or the mode byte are not valid.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        match buf {
            [GS, b'v', b'0', m, w_l, w_h, h_l, h_h, ..] => Some(RasterHeader {
                mode: PrintMode::from_code(*m)?,
                width_bytes: u16::from_le_bytes([*w_l, *w_h]),
                height: u16::from_le_bytes([*h_l, *h_h]),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_commands() {
        assert_eq!(initialize(), vec![0x1B, 0x40]);
        assert_eq!(full_cut(), vec![0x1B, 0x69]);
        assert_eq!(query_error_status(), vec![0x10, 0x04, 0x03]);
        assert_eq!(query_ticket_status(), vec![0x10, 0x04, 0x05]);
    }

    #[test]
    fn buttons_use_inverted_flag() {
        assert_eq!(set_buttons_enabled(true), vec![0x1B, 0x63, 0x35, 0x00]);
        assert_eq!(set_buttons_enabled(false), vec![0x1B, 0x63, 0x35, 0x01]);
    }

    #[test]
    fn justification_codes() {
        assert_eq!(set_justification(Justification::Left), vec![0x1B, 0x61, 0]);
        assert_eq!(set_justification(Justification::Center), vec![0x1B, 0x61, 1]);
        assert_eq!(set_justification(Justification::Right), vec![0x1B, 0x61, 2]);
    }

    #[test]
    fn raster_header_layout() {
        let header = RasterHeader {
            mode: PrintMode::DoubleWidth,
            width_bytes: 128,
            height: 4095,
        };
        assert_eq!(
            header.to_bytes(),
            [0x1D, 0x76, 0x30, 0x02, 0x80, 0x00, 0xFF, 0x0F]
        );
    }

    #[test]
    fn raster_header_decodes_what_it_encodes() {
        for mode in [
            PrintMode::Normal,
            PrintMode::DoubleHeight,
            PrintMode::DoubleWidth,
            PrintMode::Quadruple,
        ] {
            let header = RasterHeader {
                mode,
                width_bytes: 32,
                height: 300,
            };
            assert_eq!(RasterHeader::from_bytes(&header.to_bytes()), Some(header));
        }
    }

    #[test]
    fn raster_header_rejects_garbage() {
        assert_eq!(RasterHeader::from_bytes(&[0x1D, 0x76, 0x30, 0x09, 0, 0, 0, 0]), None);
        assert_eq!(RasterHeader::from_bytes(&[0x1B, 0x40]), None);
    }
}
