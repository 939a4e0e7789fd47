#![cfg_attr(not(test), no_std)]

//! LPM013M126 (JDI 1.28" 176x176 8-colour memory-in-pixel LCD) driver primitives.
//!
//! [`Lpm013`] suits boards where an `SpiDevice` owns SCS. The watchface board
//! drives SCS by hand and uses `krang_hal_esp32s3::platform::display::MipDisplay`
//! over the same [`protocol`] and [`FrameBuffer`].

mod framebuffer;
pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use framebuffer::{Color3, FrameBuffer};

use embedded_hal::{
    digital::OutputPin,
    spi::{Operation, SpiDevice},
};

/// How the panel's COM inversion is driven.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComInversion {
    /// EXTMODE high: the `EXTCOMIN` pin is toggled by the host.
    ExtComInPin,
    /// EXTMODE low: the VCOM bit of each command carries the polarity.
    Software,
}

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    pub inversion: ComInversion,
    /// Time SCS stays active after an all-clear command.
    pub clear_hold_ns: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi_hz: 2_000_000,
            inversion: ComInversion::ExtComInPin,
            clear_hold_ns: 220_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DispErr, ExtErr> {
    Spi(SpiErr),
    Disp(DispErr),
    ExtCom(ExtErr),
    /// Line number outside 1..=176.
    InvalidInput,
}

pub type DriverResult<SpiErr, DispErr, ExtErr> = Result<(), Error<SpiErr, DispErr, ExtErr>>;

/// Panel driver over an `embedded-hal` SPI device that owns SCS.
#[derive(Debug)]
pub struct Lpm013<SPI, DISP, EXTCOM> {
    spi: SPI,
    disp: DISP,
    extcom: EXTCOM,
    config: Config,
    com_high: bool,
}

impl<SPI, DISP, EXTCOM> Lpm013<SPI, DISP, EXTCOM>
where
    SPI: SpiDevice<u8>,
    DISP: OutputPin,
    EXTCOM: OutputPin,
{
    pub fn new(spi: SPI, disp: DISP, extcom: EXTCOM, config: Config) -> Self {
        Self {
            spi,
            disp,
            extcom,
            config,
            com_high: false,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn release(self) -> (SPI, DISP, EXTCOM) {
        (self.spi, self.disp, self.extcom)
    }

    pub fn enable_display(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.disp.set_high().map_err(Error::Disp)
    }

    pub fn disable_display(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.disp.set_low().map_err(Error::Disp)
    }

    /// Inverts COM once. Must run at least once a second while the panel is
    /// on, whichever inversion mode is configured.
    pub fn toggle_com(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.com_high = !self.com_high;

        match self.config.inversion {
            ComInversion::ExtComInPin if self.com_high => {
                self.extcom.set_high().map_err(Error::ExtCom)
            }
            ComInversion::ExtComInPin => self.extcom.set_low().map_err(Error::ExtCom),
            ComInversion::Software => {
                let packet = protocol::build_vcom_packet(self.com_high);
                self.spi.write(&packet).map_err(Error::Spi)
            }
        }
    }

    /// VCOM bit for the next command; always low when the pin carries COM.
    fn vcom_bit(&self) -> bool {
        self.config.inversion == ComInversion::Software && self.com_high
    }

    pub fn clear_all(&mut self) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        let packet = protocol::build_clear_packet(self.vcom_bit());
        let mut ops = [
            Operation::Write(&packet),
            Operation::DelayNs(self.config.clear_hold_ns),
        ];
        self.spi.transaction(&mut ops).map_err(Error::Spi)
    }

    /// Writes one line (1..=176).
    pub fn write_line(
        &mut self,
        line: u16,
        data: &[u8; protocol::LINE_BYTES],
    ) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        let packet = protocol::build_write_line_packet(line, data, self.vcom_bit())
            .ok_or(Error::InvalidInput)?;
        self.spi.write(&packet).map_err(Error::Spi)
    }

    /// Writes lines `first..=last` of `frame`.
    pub fn flush_lines(
        &mut self,
        frame: &FrameBuffer,
        first: u16,
        last: u16,
    ) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        if first > last {
            return Err(Error::InvalidInput);
        }

        for line in first..=last {
            let data = frame.line(line).ok_or(Error::InvalidInput)?;
            self.write_line(line, data)?;
        }
        Ok(())
    }

    pub fn flush_frame(
        &mut self,
        frame: &FrameBuffer,
    ) -> DriverResult<SPI::Error, DISP::Error, EXTCOM::Error> {
        self.flush_lines(frame, 1, protocol::HEIGHT as u16)
    }
}
