use image::{DynamicImage, Rgb, RgbImage};
use msd347::{
    Config, Dimension, Error, LockMode, PrintMode, Printer, RasterHeader, Transport, CHUNK_SIZE,
};
use pretty_assertions::assert_eq;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

/// Write log shared between the test and the transport handed to the printer.
#[derive(Clone, Default)]
struct Recorder {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Recorder {
    fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }
}

impl Transport for Recorder {
    fn read(&self, _buf: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        self.writes.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([value, value, value]),
    ))
}

#[test]
fn init_print_cut_sequence() {
    let _ = env_logger::builder().is_test(true).try_init();

    let recorder = Recorder::default();
    let mut printer = Printer::new(recorder.clone(), Config::new());

    printer.initialize().unwrap();
    printer
        .print_image(&solid(256, 100, 0x00), PrintMode::Normal)
        .unwrap();
    printer.full_cut().unwrap();
    printer.close().unwrap();

    let writes = recorder.writes();
    assert_eq!(writes.first(), Some(&vec![0x1B, 0x40]));
    assert_eq!(writes.last(), Some(&vec![0x1B, 0x69]));

    let raster = &writes[1..writes.len() - 1];
    assert!(raster.iter().all(|w| !w.is_empty() && w.len() <= CHUNK_SIZE));
    assert!(raster[..raster.len() - 1].iter().all(|w| w.len() == CHUNK_SIZE));

    let raster = raster.concat();
    assert_eq!(raster[..8].to_vec(), vec![0x1D, 0x76, 0x30, 0x00, 32, 0, 100, 0]);
    assert_eq!(raster.len(), 8 + 3200);
    assert!(raster[8..].iter().all(|&b| b == 0xFF));
}

#[test]
fn header_round_trip_from_printed_bytes() {
    let recorder = Recorder::default();
    let printer = Printer::new(recorder.clone(), Config::new());
    printer
        .print_image(&solid(40, 7, 0xFF), PrintMode::DoubleHeight)
        .unwrap();

    let raster = recorder.writes().concat();
    assert_eq!(
        RasterHeader::from_bytes(&raster),
        Some(RasterHeader {
            mode: PrintMode::DoubleHeight,
            width_bytes: 5,
            height: 7,
        })
    );
    assert!(raster[8..].iter().all(|&b| b == 0x00));
}

#[test]
fn oversized_images_write_nothing() {
    let recorder = Recorder::default();
    let printer = Printer::new(recorder.clone(), Config::new());

    let wide = printer.print_image(&solid(1040, 1, 0x00), PrintMode::Normal);
    assert!(matches!(
        wide,
        Err(Error::OutOfRange {
            dimension: Dimension::Width,
            value: 130,
            ..
        })
    ));

    let tall = printer.print_image(&solid(8, 5000, 0x00), PrintMode::Normal);
    assert!(matches!(
        tall,
        Err(Error::OutOfRange {
            dimension: Dimension::Height,
            value: 5000,
            ..
        })
    ));

    assert!(recorder.writes().is_empty());
}

/// Transport that answers each query with a reply derived from its request
/// after a delay, and panics if any write lands inside a query exchange.
#[derive(Default)]
struct SlowDevice {
    busy: AtomicBool,
    pending: Mutex<Option<u8>>,
}

impl Transport for SlowDevice {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error> {
        thread::sleep(Duration::from_millis(2));
        let selector = self.pending.lock().unwrap().take();
        self.busy.store(false, Ordering::SeqCst);
        // error query gets a clear status, ticket query gets "present"
        buf[0] = match selector {
            Some(3) => 0x00,
            Some(5) => 0x04,
            _ => 0xFF,
        };
        Ok(1)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        assert!(
            !self.busy.load(Ordering::SeqCst),
            "write {:X?} inside a query exchange",
            buf
        );
        if buf[0] == 0x10 {
            self.busy.store(true, Ordering::SeqCst);
            *self.pending.lock().unwrap() = buf.last().copied();
        }
        thread::sleep(Duration::from_millis(2));
        Ok(buf.len())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[test]
fn concurrent_queries_do_not_cross_talk() {
    let printer = Printer::new(SlowDevice::default(), Config::new());

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    printer.query_error().unwrap();
                    assert!(!printer.ticket_info().unwrap().ticket_taken);
                }
            });
        }
    });
}

#[test]
fn exclusive_mode_serializes_plain_commands() {
    let printer = Printer::new(
        SlowDevice::default(),
        Config::new().lock_mode(LockMode::Exclusive),
    );

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..10 {
                printer.query_error().unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..10 {
                printer.full_cut().unwrap();
            }
        });
    });
}
