//! LCD device control: graphics and configuration commands.

use crate::orientation::Orientation;
use crate::{Error, Result};
use std::io::{Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_serial::{DataBits, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use super::protocol::{
    build_polyline, decode_word, polyline_command, Command, AXIS_X, AXIS_Y, BACKGROUND_COLOR,
    CLEAR_SCREEN, CONTRAST, DISPLAY_SIZE, ELLIPSE, ELLIPSE_FILLED, LINE, ORIENTATION, PUT_PIXEL,
    RECTANGLE, RECTANGLE_FILLED,
};
use super::text::Text;
use super::transport::Transport;

/// Contrast restored by [`LcdDevice::on`] if none has been set yet.
pub const DEFAULT_CONTRAST: u16 = 15;

/// LCD device controller.
///
/// All commands go through one lock, so a command and its ACK are never
/// interleaved with another caller's.
pub struct LcdDevice<P> {
    inner: Mutex<Inner<P>>,
}

pub(super) struct Inner<P> {
    transport: Transport<P>,
    contrast: u16,
}

impl<P: Read + Write> Inner<P> {
    /// Sends a command that answers with a bare ACK.
    pub(super) fn command(&mut self, command: Command, params: &[u16]) -> Result<()> {
        self.transport.transact(command, params)?;
        Ok(())
    }

    /// Sends a command that answers with a single word.
    pub(super) fn query(&mut self, command: Command, params: &[u16]) -> Result<u16> {
        let payload = self.transport.transact(command, params)?;
        match payload.as_deref() {
            Some(&[high, low]) => Ok(decode_word(high, low)),
            _ => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("command 0x{:04X} has no word response", command.opcode),
            ))),
        }
    }

    /// Sends the contrast command, caching non-zero values.
    fn write_contrast(&mut self, contrast: u16) -> Result<u16> {
        let previous = self.query(CONTRAST, &[contrast])?;
        if contrast != 0 {
            self.contrast = contrast;
        }
        info!("Contrast set to {} (was {})", contrast, previous);
        Ok(previous)
    }

    pub(super) fn transport(&mut self) -> &mut Transport<P> {
        &mut self.transport
    }
}

impl LcdDevice<Box<dyn SerialPort>> {
    /// Opens the display on a serial port (8 data bits, no parity, 1 stop bit).
    ///
    /// `timeout` bounds every read; a device that stays silent longer surfaces
    /// as an I/O error.
    pub fn open(port_path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = tokio_serial::new(port_path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|e| {
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if (*kind == std::io::ErrorKind::NotFound
                        || *kind == std::io::ErrorKind::PermissionDenied)
                        && !std::path::Path::new(port_path).exists()
                    {
                        return Error::PortNotFound(port_path.to_string());
                    }
                }
                Error::Serial(e)
            })?;

        info!("LCD opened at {} ({} baud)", port_path, baud_rate);
        Ok(Self::new(Transport::new(port)))
    }
}

impl<P: Read + Write> LcdDevice<P> {
    /// Creates a controller over an existing transport.
    pub fn new(transport: Transport<P>) -> Self {
        Self::with_contrast(transport, DEFAULT_CONTRAST)
    }

    /// Creates a controller whose cached contrast starts at `contrast`.
    pub fn with_contrast(transport: Transport<P>, contrast: u16) -> Self {
        Self {
            inner: Mutex::new(Inner {
                transport,
                contrast,
            }),
        }
    }

    /// Replaces the contrast restored by [`LcdDevice::on`] before any
    /// command is sent. Zero is ignored, as with [`LcdDevice::set_contrast`].
    pub fn initial_contrast(mut self, contrast: u16) -> Self {
        if contrast != 0 {
            self.inner
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .contrast = contrast;
        }
        self
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the text subsystem.
    pub fn text(&self) -> Text<'_, P> {
        Text::new(self)
    }

    /// Releases the transport.
    pub fn into_transport(self) -> Transport<P> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .transport
    }

    /// Clears the screen to the background color.
    pub fn clear_screen(&self) -> Result<()> {
        self.lock().command(CLEAR_SCREEN, &[])
    }

    /// Sets a single pixel.
    pub fn put_pixel(&self, x: u16, y: u16, color: u16) -> Result<()> {
        self.lock().command(PUT_PIXEL, &[x, y, color])
    }

    /// Draws a line between two points.
    pub fn draw_line(&self, x1: u16, y1: u16, x2: u16, y2: u16, color: u16) -> Result<()> {
        self.lock().command(LINE, &[x1, y1, x2, y2, color])
    }

    /// Draws a rectangle from two opposite corners.
    pub fn draw_rectangle(
        &self,
        x1: u16,
        y1: u16,
        x2: u16,
        y2: u16,
        color: u16,
        filled: bool,
    ) -> Result<()> {
        let command = if filled { RECTANGLE_FILLED } else { RECTANGLE };
        self.lock().command(command, &[x1, y1, x2, y2, color])
    }

    /// Draws an ellipse centred on (x, y).
    pub fn draw_ellipse(
        &self,
        x: u16,
        y: u16,
        x_radius: u16,
        y_radius: u16,
        color: u16,
        filled: bool,
    ) -> Result<()> {
        let command = if filled { ELLIPSE_FILLED } else { ELLIPSE };
        self.lock()
            .command(command, &[x, y, x_radius, y_radius, color])
    }

    /// Draws a circle centred on (x, y).
    pub fn draw_circle(&self, x: u16, y: u16, radius: u16, color: u16, filled: bool) -> Result<()> {
        self.draw_ellipse(x, y, radius, radius, color, filled)
    }

    /// Draws a polyline through `vertices`.
    ///
    /// A closed polyline joins the last vertex to the first; filled implies
    /// closed.
    pub fn draw_polyline(
        &self,
        vertices: &[(u16, u16)],
        color: u16,
        closed: bool,
        filled: bool,
    ) -> Result<()> {
        let command = polyline_command(closed, filled);
        let words = build_polyline(command, vertices, color)?;

        let mut inner = self.lock();
        let transport = inner.transport();
        transport.send_words(&words)?;
        transport.await_ack(command.response_len)?;
        debug!("Drew polyline with {} vertices", vertices.len());
        Ok(())
    }

    /// Draws a triangle.
    pub fn draw_triangle(&self, vertices: [(u16, u16); 3], color: u16, filled: bool) -> Result<()> {
        self.draw_polyline(&vertices, color, true, filled)
    }

    /// Sets the contrast and returns the previous value.
    ///
    /// Non-zero values are remembered for [`LcdDevice::on`]. Most LCD modules
    /// only distinguish zero (off) from non-zero.
    pub fn set_contrast(&self, contrast: u16) -> Result<u16> {
        self.lock().write_contrast(contrast)
    }

    /// Returns the cached contrast that [`LcdDevice::on`] restores.
    pub fn contrast(&self) -> u16 {
        self.lock().contrast
    }

    /// Blanks the display by setting contrast to zero. Returns the previous
    /// contrast.
    pub fn off(&self) -> Result<u16> {
        self.set_contrast(0)
    }

    /// Restores the last non-zero contrast. Returns the previous contrast.
    pub fn on(&self) -> Result<u16> {
        let mut inner = self.lock();
        let contrast = inner.contrast;
        inner.write_contrast(contrast)
    }

    /// Sets the orientation and returns the previous one.
    pub fn set_orientation(&self, orientation: Orientation) -> Result<Orientation> {
        let value = self.lock().query(ORIENTATION, &[orientation.word()])?;
        let previous = Orientation::from_word(value).ok_or(Error::UnexpectedResponse {
            opcode: ORIENTATION.opcode,
            value,
        })?;
        info!("Orientation set to {} (was {})", orientation, previous);
        Ok(previous)
    }

    /// Queries the display resolution in the current orientation.
    pub fn display_size(&self) -> Result<(u16, u16)> {
        let mut inner = self.lock();
        let width = inner.query(DISPLAY_SIZE, &[AXIS_X])?;
        let height = inner.query(DISPLAY_SIZE, &[AXIS_Y])?;
        debug!("Display size: {}x{}", width, height);
        Ok((width, height))
    }

    /// Sets the background color and returns the previous one.
    pub fn set_background_color(&self, color: u16) -> Result<u16> {
        self.lock().query(BACKGROUND_COLOR, &[color])
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockPort;
    use super::super::protocol::ACK;
    use super::*;
    use crate::ErrorKind;

    fn device(port: &mut MockPort) -> LcdDevice<&mut MockPort> {
        LcdDevice::new(Transport::new(port))
    }

    #[test]
    fn test_rectangle_opcodes() {
        let mut port = MockPort::with_responses(&[ACK, ACK]);
        let lcd = device(&mut port);
        lcd.draw_rectangle(1, 2, 3, 4, 0xF800, false).unwrap();
        lcd.draw_rectangle(1, 2, 3, 4, 0xF800, true).unwrap();
        drop(lcd);
        assert_eq!(
            port.written(),
            &[
                0xFF, 0xC5, 0, 1, 0, 2, 0, 3, 0, 4, 0xF8, 0x00, //
                0xFF, 0xC4, 0, 1, 0, 2, 0, 3, 0, 4, 0xF8, 0x00,
            ]
        );
    }

    #[test]
    fn test_circle_is_ellipse() {
        let mut port = MockPort::with_responses(&[ACK]);
        device(&mut port).draw_circle(50, 60, 10, 0x001F, true).unwrap();
        assert_eq!(
            port.written(),
            &[0xFF, 0xB1, 0, 50, 0, 60, 0, 10, 0, 10, 0x00, 0x1F]
        );
    }

    #[test]
    fn test_clear_and_pixel() {
        let mut port = MockPort::with_responses(&[ACK, ACK]);
        let lcd = device(&mut port);
        lcd.clear_screen().unwrap();
        lcd.put_pixel(5, 6, 0xFFFF).unwrap();
        drop(lcd);
        assert_eq!(
            port.written(),
            &[0xFF, 0xCD, 0xFF, 0xC1, 0, 5, 0, 6, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_polyline_300_vertices() {
        let vertices: Vec<(u16, u16)> = (0..300).map(|i| (i, 1000 + i)).collect();
        let mut port = MockPort::with_responses(&[ACK]);
        device(&mut port)
            .draw_polyline(&vertices, 0x07E0, false, false)
            .unwrap();

        let mut expected = vec![0x00, 0x15, 0x01, 0x2C];
        for &(x, _) in &vertices {
            expected.extend_from_slice(&x.to_be_bytes());
        }
        for &(_, y) in &vertices {
            expected.extend_from_slice(&y.to_be_bytes());
        }
        expected.extend_from_slice(&[0x07, 0xE0]);
        assert_eq!(port.written(), expected.as_slice());
    }

    #[test]
    fn test_triangle_is_closed_polyline() {
        let mut port = MockPort::with_responses(&[ACK]);
        device(&mut port)
            .draw_triangle([(0, 0), (10, 0), (5, 8)], 0xFFFF, false)
            .unwrap();
        assert_eq!(
            port.written(),
            &[0x00, 0x13, 0, 3, 0, 0, 0, 10, 0, 5, 0, 0, 0, 0, 0, 8, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_polyline_overflow_sends_nothing() {
        let vertices = vec![(0u16, 0u16); 70_000];
        let mut port = MockPort::new();
        let err = device(&mut port)
            .draw_polyline(&vertices, 0, false, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(port.written().is_empty());
    }

    #[test]
    fn test_contrast_off_on_restores() {
        let mut port = MockPort::with_responses(&[
            ACK, 0x00, 0x0F, // set 200, was 15
            ACK, 0x00, 0xC8, // off, was 200
            ACK, 0x00, 0x00, // on, was 0
        ]);
        let lcd = device(&mut port);
        assert_eq!(lcd.set_contrast(200).unwrap(), 15);
        assert_eq!(lcd.contrast(), 200);
        assert_eq!(lcd.off().unwrap(), 200);
        assert_eq!(lcd.contrast(), 200);
        assert_eq!(lcd.on().unwrap(), 0);
        drop(lcd);
        assert_eq!(
            port.written(),
            &[
                0xFF, 0x9C, 0x00, 0xC8, //
                0xFF, 0x9C, 0x00, 0x00, //
                0xFF, 0x9C, 0x00, 0xC8,
            ]
        );
    }

    #[test]
    fn test_contrast_caches_requested_value() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x63]);
        let lcd = device(&mut port);
        lcd.set_contrast(7).unwrap();
        // Cache holds what was requested, not the echoed previous value
        assert_eq!(lcd.contrast(), 7);
    }

    #[test]
    fn test_on_uses_default_contrast() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x00]);
        let lcd = device(&mut port);
        lcd.on().unwrap();
        drop(lcd);
        assert_eq!(port.written(), &[0xFF, 0x9C, 0x00, 0x0F]);
    }

    #[test]
    fn test_initial_contrast() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x00]);
        let lcd = device(&mut port).initial_contrast(120).initial_contrast(0);
        assert_eq!(lcd.contrast(), 120);
        lcd.on().unwrap();
        drop(lcd);
        assert_eq!(port.written(), &[0xFF, 0x9C, 0x00, 0x78]);
    }

    #[test]
    fn test_on_races_set_contrast() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x00, ACK, 0x00, 0x00]);
        let lcd = device(&mut port);
        std::thread::scope(|s| {
            s.spawn(|| lcd.set_contrast(200).unwrap());
            s.spawn(|| lcd.on().unwrap());
        });
        assert_eq!(lcd.contrast(), 200);
        drop(lcd);

        // on either restores the old cache before the set, or the new value
        // after it; it never replays a stale value after the set
        let written = port.written();
        assert_eq!(&written[4..], &[0xFF, 0x9C, 0x00, 0xC8]);
        assert!(
            written[..4] == [0xFF, 0x9C, 0x00, 0x0F] || written[..4] == [0xFF, 0x9C, 0x00, 0xC8]
        );
    }

    #[test]
    fn test_contrast_nak_keeps_cache() {
        let mut port = MockPort::with_responses(&[0x15]);
        let lcd = device(&mut port);
        let err = lcd.set_contrast(99).unwrap_err();
        assert!(matches!(err, Error::Protocol { received: 0x15 }));
        assert_eq!(lcd.contrast(), DEFAULT_CONTRAST);
    }

    #[test]
    fn test_set_orientation_returns_previous() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x02]);
        let lcd = device(&mut port);
        let previous = lcd.set_orientation(Orientation::Landscape).unwrap();
        assert_eq!(previous, Orientation::Portrait);
        drop(lcd);
        assert_eq!(port.written(), &[0xFF, 0x9E, 0x00, 0x00]);
    }

    #[test]
    fn test_set_orientation_unknown_previous() {
        let mut port = MockPort::with_responses(&[ACK, 0x01, 0x00]);
        let err = device(&mut port)
            .set_orientation(Orientation::Portrait)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse {
                opcode: 0xFF9E,
                value: 0x0100
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Consistency);
    }

    #[test]
    fn test_display_size_two_round_trips() {
        let mut port = MockPort::with_responses(&[ACK, 0x01, 0x40, ACK, 0x00, 0xF0]);
        let lcd = device(&mut port);
        assert_eq!(lcd.display_size().unwrap(), (320, 240));
        drop(lcd);
        assert_eq!(
            port.written(),
            &[0xFF, 0xA6, 0x00, 0x00, 0xFF, 0xA6, 0x00, 0x01]
        );
    }

    #[test]
    fn test_display_size_nak_on_second_axis() {
        let mut port = MockPort::with_responses(&[ACK, 0x01, 0x40, 0x15]);
        let err = device(&mut port).display_size().unwrap_err();
        assert!(matches!(err, Error::Protocol { received: 0x15 }));
    }

    #[test]
    fn test_background_color() {
        let mut port = MockPort::with_responses(&[ACK, 0x00, 0x00]);
        let previous = device(&mut port).set_background_color(0x001F).unwrap();
        assert_eq!(previous, 0x0000);
        assert_eq!(port.written(), &[0xFF, 0xA4, 0x00, 0x1F]);
    }

    #[test]
    fn test_into_transport() {
        let mut port = MockPort::with_responses(&[ACK]);
        let lcd = device(&mut port);
        lcd.clear_screen().unwrap();
        let port = lcd.into_transport().into_inner();
        assert_eq!(port.written(), &[0xFF, 0xCD]);
    }

    // Hardware tests are skipped by default
    #[test]
    #[ignore]
    fn test_device_open() {
        let device = LcdDevice::open("/dev/ttyUSB0", crate::DEFAULT_BAUD_RATE, Duration::from_secs(2));
        assert!(device.is_ok());
    }
}
