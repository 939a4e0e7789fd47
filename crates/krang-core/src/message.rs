//! Companion settings dictionary.
//!
//! Wire layout, little endian:
//!
//! ```text
//! u8 tuple_count
//! repeated tuple_count times:
//!     u32 key, u8 type, u16 length, [u8; length] value
//! ```
//!
//! Types: `0` raw bytes, `1` C string, `2` unsigned integer, `3` signed
//! integer. Integers are 1, 2 or 4 bytes wide.

use core::str;

use log::{debug, warn};

use crate::{color::mask_rgb, settings::SettingsUpdate};

pub const KEY_BACKGROUND_COLOR: u32 = 0;
pub const KEY_TIME_COLOR: u32 = 1;
pub const KEY_DATE_COLOR: u32 = 2;
pub const KEY_USE_24_HOUR: u32 = 3;

/// Largest message accepted from the companion.
pub const MAX_MESSAGE_LEN: usize = 256;

const TUPLE_HEADER_LEN: usize = 7;

const TYPE_BYTES: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Owned copy of one received message.
pub type MessageBuffer = heapless::Vec<u8, MAX_MESSAGE_LEN>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageError {
    Truncated,
    UnsupportedType(u8),
    /// Integer value not 1, 2 or 4 bytes long.
    InvalidLength,
    TrailingBytes,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TupleValue<'a> {
    Bytes(&'a [u8]),
    /// Raw string bytes with the terminating NUL removed.
    CString(&'a [u8]),
    Unsigned(u32),
    Signed(i32),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tuple<'a> {
    pub key: u32,
    pub value: TupleValue<'a>,
}

/// Walks the tuples of one message; stops after the first error.
pub struct Tuples<'a> {
    rest: &'a [u8],
    remaining: u8,
    failed: bool,
}

impl<'a> Tuples<'a> {
    pub fn new(message: &'a [u8]) -> Result<Self, MessageError> {
        let (&count, rest) = message.split_first().ok_or(MessageError::Truncated)?;
        Ok(Self {
            rest,
            remaining: count,
            failed: false,
        })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], MessageError> {
        if self.rest.len() < len {
            return Err(MessageError::Truncated);
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Ok(head)
    }

    fn next_tuple(&mut self) -> Result<Tuple<'a>, MessageError> {
        let header = self.take(TUPLE_HEADER_LEN)?;
        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let kind = header[4];
        let len = u16::from_le_bytes([header[5], header[6]]) as usize;
        let raw = self.take(len)?;

        let value = match kind {
            TYPE_BYTES => TupleValue::Bytes(raw),
            TYPE_CSTRING => {
                let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
                TupleValue::CString(&raw[..end])
            }
            TYPE_UINT => TupleValue::Unsigned(match raw {
                [a] => *a as u32,
                [a, b] => u16::from_le_bytes([*a, *b]) as u32,
                [a, b, c, d] => u32::from_le_bytes([*a, *b, *c, *d]),
                _ => return Err(MessageError::InvalidLength),
            }),
            TYPE_INT => TupleValue::Signed(match raw {
                [a] => *a as i8 as i32,
                [a, b] => i16::from_le_bytes([*a, *b]) as i32,
                [a, b, c, d] => i32::from_le_bytes([*a, *b, *c, *d]),
                _ => return Err(MessageError::InvalidLength),
            }),
            other => return Err(MessageError::UnsupportedType(other)),
        };

        Ok(Tuple { key, value })
    }
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Result<Tuple<'a>, MessageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if self.remaining == 0 {
            if self.rest.is_empty() {
                return None;
            }
            self.failed = true;
            return Some(Err(MessageError::TrailingBytes));
        }

        self.remaining -= 1;
        let tuple = self.next_tuple();
        self.failed = tuple.is_err();
        Some(tuple)
    }
}

/// Accepts `RRGGBB`, `#RRGGBB` and `0xRRGGBB`.
fn parse_hex_color(text: &str) -> Option<u32> {
    let text = text.trim();
    let digits = text
        .strip_prefix('#')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

fn color_value(value: TupleValue<'_>) -> Option<u32> {
    match value {
        TupleValue::Unsigned(v) => Some(mask_rgb(v)),
        TupleValue::Signed(v) if v >= 0 => Some(mask_rgb(v as u32)),
        TupleValue::CString(raw) => str::from_utf8(raw).ok().and_then(parse_hex_color),
        TupleValue::Signed(_) | TupleValue::Bytes(_) => None,
    }
}

fn flag_value(value: TupleValue<'_>) -> Option<bool> {
    match value {
        TupleValue::Unsigned(v) => Some(v != 0),
        TupleValue::Signed(v) => Some(v != 0),
        TupleValue::CString(raw) => {
            let text = str::from_utf8(raw).ok()?.trim();
            if text.eq_ignore_ascii_case("true") || text == "1" {
                Some(true)
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Some(false)
            } else {
                None
            }
        }
        TupleValue::Bytes(_) => None,
    }
}

fn keep<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

/// Decodes a whole message into a sparse update.
///
/// Unknown keys are skipped and a known key with an unusable value is
/// dropped; any structural error rejects the message.
pub fn decode_settings_update(message: &[u8]) -> Result<SettingsUpdate, MessageError> {
    let mut update = SettingsUpdate::default();

    for tuple in Tuples::new(message)? {
        let Tuple { key, value } = tuple?;
        let accepted = match key {
            KEY_BACKGROUND_COLOR => keep(&mut update.background_color, color_value(value)),
            KEY_TIME_COLOR => keep(&mut update.time_color, color_value(value)),
            KEY_DATE_COLOR => keep(&mut update.date_color, color_value(value)),
            KEY_USE_24_HOUR => keep(&mut update.use_24_hour, flag_value(value)),
            _ => {
                debug!("message: ignoring key {}", key);
                continue;
            }
        };

        if !accepted {
            warn!("message: dropping key {} with unusable value {:?}", key, value);
        }
    }

    Ok(update)
}

/// Copies a received payload for hand-off to the app; empty or oversized
/// payloads are dropped.
pub fn buffer_message(payload: &[u8]) -> Option<MessageBuffer> {
    if payload.is_empty() {
        return None;
    }

    match MessageBuffer::from_slice(payload) {
        Ok(buffer) => Some(buffer),
        Err(()) => {
            warn!(
                "message: dropping {} byte payload (max {})",
                payload.len(),
                MAX_MESSAGE_LEN
            );
            None
        }
    }
}
