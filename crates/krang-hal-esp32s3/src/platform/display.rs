use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};
use lpm013m126::{
    FrameBuffer,
    protocol::{self, HEIGHT},
};

const CS_SETUP_NS: u32 = 3_000;
const CS_HOLD_NS: u32 = 1_000;
const CLEAR_HOLD_NS: u32 = 220_000;
const POWER_ON_US: u32 = 60;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayError<SpiErr, DispErr, CsErr> {
    Spi(SpiErr),
    Disp(DispErr),
    Cs(CsErr),
    Protocol,
}

pub type MipDisplayResult<SpiErr, DispErr, CsErr> = Result<(), DisplayError<SpiErr, DispErr, CsErr>>;

/// Board-level adapter for the LPM013M126 colour memory LCD.
///
/// CS is active high and driven by hand. EXTMODE is strapped low, so COM
/// inversion is carried by the VCOM bit of every command and must be
/// refreshed at least once a second.
#[derive(Debug)]
pub struct MipDisplay<SPI, DISP, CS> {
    spi: SPI,
    disp: DISP,
    cs: CS,
    vcom_high: bool,
}

impl<SPI, DISP, CS> MipDisplay<SPI, DISP, CS>
where
    SPI: SpiBus<u8>,
    DISP: OutputPin,
    CS: OutputPin,
{
    pub fn new(spi: SPI, disp: DISP, cs: CS) -> Self {
        Self {
            spi,
            disp,
            cs,
            vcom_high: false,
        }
    }

    /// Enables panel output with CS idle.
    pub fn initialize<D>(&mut self, delay: &mut D) -> MipDisplayResult<SPI::Error, DISP::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.cs.set_low().map_err(DisplayError::Cs)?;
        self.disp.set_high().map_err(DisplayError::Disp)?;

        delay.delay_us(POWER_ON_US);
        Ok(())
    }

    pub fn clear_all<D>(&mut self, delay: &mut D) -> MipDisplayResult<SPI::Error, DISP::Error, CS::Error>
    where
        D: DelayNs,
    {
        let packet = protocol::build_clear_packet(self.next_vcom());
        self.transaction(&packet, delay)?;
        delay.delay_ns(CLEAR_HOLD_NS);
        Ok(())
    }

    /// Toggles COM without touching pixel memory.
    pub fn refresh_vcom<D>(&mut self, delay: &mut D) -> MipDisplayResult<SPI::Error, DISP::Error, CS::Error>
    where
        D: DelayNs,
    {
        let packet = protocol::build_vcom_packet(self.next_vcom());
        self.transaction(&packet, delay)
    }

    /// Writes every line of `frame`, one CS window per line.
    pub fn flush_frame<D>(
        &mut self,
        frame: &FrameBuffer,
        delay: &mut D,
    ) -> MipDisplayResult<SPI::Error, DISP::Error, CS::Error>
    where
        D: DelayNs,
    {
        let vcom = self.next_vcom();

        for line in 1..=HEIGHT as u16 {
            let data = frame.line(line).ok_or(DisplayError::Protocol)?;
            let packet =
                protocol::build_write_line_packet(line, data, vcom).ok_or(DisplayError::Protocol)?;
            self.transaction(&packet, delay)?;
        }

        Ok(())
    }

    fn next_vcom(&mut self) -> bool {
        self.vcom_high = !self.vcom_high;
        self.vcom_high
    }

    fn transaction<D>(
        &mut self,
        bytes: &[u8],
        delay: &mut D,
    ) -> MipDisplayResult<SPI::Error, DISP::Error, CS::Error>
    where
        D: DelayNs,
    {
        self.cs.set_high().map_err(DisplayError::Cs)?;
        delay.delay_ns(CS_SETUP_NS);

        self.spi.write(bytes).map_err(DisplayError::Spi)?;
        self.spi.flush().map_err(DisplayError::Spi)?;

        delay.delay_ns(CS_HOLD_NS);
        self.cs.set_low().map_err(DisplayError::Cs)?;
        Ok(())
    }
}
