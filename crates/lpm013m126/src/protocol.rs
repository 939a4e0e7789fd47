//! Wire-level protocol helpers for LPM013M126.

/// Panel width in pixels.
pub const WIDTH: usize = 176;
/// Panel height in pixels.
pub const HEIGHT: usize = 176;
/// Bits sent per pixel in 3-bit colour mode (R, G, B).
pub const BITS_PER_PIXEL: usize = 3;
/// Number of bytes in one display line.
pub const LINE_BYTES: usize = WIDTH * BITS_PER_PIXEL / 8;
/// Total framebuffer size in bytes.
pub const BUFFER_SIZE: usize = LINE_BYTES * HEIGHT;

/// Mode bits for a 3-bit colour line update.
pub const CMD_UPDATE_3BIT: u8 = 0x80;
/// Mode bits for all-clear.
pub const CMD_ALL_CLEAR: u8 = 0x20;
/// Mode bits for a VCOM-only refresh.
pub const CMD_NO_UPDATE: u8 = 0x00;
/// COM inversion flag, OR-ed into every command byte.
pub const VCOM_BIT: u8 = 0x40;

/// Packet size for a one-line write command.
///
/// Layout:
/// - 1 byte mode (+ upper address bits, always zero on this panel)
/// - 1 byte gate address
/// - 66 bytes pixel payload
/// - 2 bytes transfer dummy
pub const WRITE_LINE_PACKET_SIZE: usize = 1 + 1 + LINE_BYTES + 2;

/// Packet size for all-clear and VCOM-only commands.
pub const COMMAND_PACKET_SIZE: usize = 2;

#[inline]
const fn command_byte(mode: u8, vcom_high: bool) -> u8 {
    mode | if vcom_high { VCOM_BIT } else { 0x00 }
}

/// Builds a wire address byte for line 1..=176.
///
/// Returns `None` for invalid line numbers.
#[inline]
pub fn encode_line_address(line: u16) -> Option<u8> {
    if !(1..=HEIGHT as u16).contains(&line) {
        return None;
    }

    Some(line as u8)
}

/// Builds the all-clear command packet.
#[inline]
pub fn build_clear_packet(vcom_high: bool) -> [u8; COMMAND_PACKET_SIZE] {
    [command_byte(CMD_ALL_CLEAR, vcom_high), 0x00]
}

/// Builds the VCOM-only packet used to keep the panel inverting while idle.
#[inline]
pub fn build_vcom_packet(vcom_high: bool) -> [u8; COMMAND_PACKET_SIZE] {
    [command_byte(CMD_NO_UPDATE, vcom_high), 0x00]
}

/// Builds a one-line update command packet.
///
/// Returns `None` when `line` is out of range.
#[inline]
pub fn build_write_line_packet(
    line: u16,
    line_data: &[u8; LINE_BYTES],
    vcom_high: bool,
) -> Option<[u8; WRITE_LINE_PACKET_SIZE]> {
    let address = encode_line_address(line)?;

    let mut packet = [0u8; WRITE_LINE_PACKET_SIZE];
    packet[0] = command_byte(CMD_UPDATE_3BIT, vcom_high);
    packet[1] = address;
    packet[2..2 + LINE_BYTES].copy_from_slice(line_data);

    Some(packet)
}
