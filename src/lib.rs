//! MSD347 Ticket Printer Driver
//!
//! This crate provides a driver for the MSD347 thermal ticket printer
//! connected over USB. It encodes print commands, rasterizes images into the
//! printer's 1-bit format and decodes the status replies.
//!
//! # Example
//!
//! ```rust,no_run
//! use msd347::{Config, Justification, PrintMode, Printer};
//!
//! let image = image::open("ticket.png").unwrap();
//!
//! let mut printer = Printer::connect(Config::new()).unwrap();
//! printer.initialize().unwrap();
//! printer.set_justification(Justification::Center).unwrap();
//! printer.print_image(&image, PrintMode::Normal).unwrap();
//! printer.full_cut().unwrap();
//! printer.query_error().unwrap();
//! printer.close().unwrap();
//! ```
//!
//! Any [`Transport`] can stand in for the USB connection, which is how the
//! protocol is exercised without a device.

pub mod command;
mod error;
mod printer;
mod raster;
mod status;
mod transport;
mod usb;

pub use crate::{
    command::{Justification, PrintMode, RasterHeader},
    error::{Dimension, Error},
    printer::{Config, LockMode, Printer, CHUNK_SIZE},
    raster::{RasterBitmap, MAX_HEIGHT_DOTS, MAX_WIDTH_BYTES},
    status::{ErrorInfo, ErrorStatus, TicketInfo, TicketStatus},
    transport::Transport,
    usb::{UsbTransport, PRODUCT_ID, VENDOR_ID},
};
