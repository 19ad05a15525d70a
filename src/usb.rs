use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, UsbContext};
use std::time::Duration;

use crate::{error::Error, printer::Config, transport::Transport};

pub const VENDOR_ID: u16 = 0x0519;
pub const PRODUCT_ID: u16 = 0x2013;

const INTERFACE: u8 = 0;
const ENDPOINT_OUT: u8 = 0x03;
const ENDPOINT_IN: u8 = 0x81;

/// USB bulk transport to an MSD347 printer.
pub struct UsbTransport {
    /// `None` once the transport is closed.
    handle: Option<DeviceHandle<Context>>,
    timeout: Duration,
}

impl UsbTransport {
    /// Open the first attached MSD347 and claim its printer interface.
    pub fn open(config: &Config) -> Result<Self, Error> {
        let mut context = Context::new()?;

        let (device, device_desc, handle) = match Self::open_device(&mut context) {
            Ok(found) => found,
            Err(err) => {
                debug!("{:?}", err);
                return Err(err);
            }
        };
        debug!(
            "opened {:04x}:{:04x} on bus {} address {}",
            device_desc.vendor_id(),
            device_desc.product_id(),
            device.bus_number(),
            device.address()
        );

        // usblp holds the interface on Linux; detaching is unsupported elsewhere
        if let Err(err) = handle.set_auto_detach_kernel_driver(true) {
            debug!("kernel driver auto detach unavailable: {:?}", err);
        }
        handle.claim_interface(INTERFACE)?;
        info!("claimed interface {} of MSD347", INTERFACE);

        Ok(UsbTransport {
            handle: Some(handle),
            timeout: config.timeout,
        })
    }

    fn open_device(
        context: &mut Context,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = context.devices()?;

        if devices.is_empty() {
            debug!("No USB device attached");
            return Err(Error::DeviceOffline);
        }
        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() == VENDOR_ID && device_desc.product_id() == PRODUCT_ID {
                match device.open() {
                    Ok(handle) => return Ok((device, device_desc, handle)),
                    Err(err) => {
                        debug!("Failed to open device: {:?}", err);
                        continue;
                    }
                }
            }
        }
        debug!("No device match {:04x}:{:04x}", VENDOR_ID, PRODUCT_ID);
        Err(Error::DeviceOffline)
    }
}

impl UsbTransport {
    fn handle(&self) -> Result<&DeviceHandle<Context>, Error> {
        self.handle.as_ref().ok_or(Error::UsbError(rusb::Error::NoDevice))
    }
}

impl Transport for UsbTransport {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = self.handle()?.read_bulk(ENDPOINT_IN, buf, self.timeout)?;
        debug!("usb read {} bytes: {:X?}", n, &buf[..n]);
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        Ok(self.handle()?.write_bulk(ENDPOINT_OUT, buf, self.timeout)?)
    }

    /// Release the printer interface and close the device.
    ///
    /// Dropping the handle also drops its reference to the libusb context. A
    /// second call fails with `NoDevice`.
    fn close(&mut self) -> Result<(), Error> {
        let handle = self
            .handle
            .take()
            .ok_or(Error::UsbError(rusb::Error::NoDevice))?;
        handle.release_interface(INTERFACE)?;
        info!("released interface {} of MSD347", INTERFACE);
        drop(handle);
        Ok(())
    }
}
