//! Compact variable-length length prefix ("shortvec" / compact-u16).
//!
//! Every array in the message wire format is prefixed with its length in
//! this encoding: 7 value bits per byte, least significant group first, with
//! the high bit (0x80) set on every byte except the last.
//!
//! ```text
//!   0x00000 .. 0x0007f  -> 1 byte
//!   0x00080 .. 0x03fff  -> 2 bytes
//!   0x04000 .. 0x1fffff -> 3 bytes
//! ```

/// Upper bound on bytes read by [`decode_length`]; keeps the shift below 64.
pub const MAX_ENCODING_LENGTH: usize = 10;

/// Encode `value` in shortvec format.
pub fn encode_length(value: usize) -> Vec<u8> {
    let mut rem = value;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut elem = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(elem);
            break;
        }
        elem |= 0x80;
        out.push(elem);
    }

    out
}

/// Decode a shortvec length from the front of `raw`.
///
/// Returns `(value, bytes_consumed)`. Decoding stops at the first byte
/// without the continuation bit or at the end of input, so an empty slice
/// yields `(0, 0)`. Callers that need strict framing check `bytes_consumed`
/// against what they expected.
pub fn decode_length(raw: &[u8]) -> (usize, usize) {
    let mut length = 0u64;
    let mut size = 0usize;

    while size < raw.len() && size < MAX_ENCODING_LENGTH {
        let elem = raw[size];
        length |= ((elem & 0x7f) as u64) << (size * 7);
        size += 1;
        if elem & 0x80 == 0 {
            break;
        }
    }

    (length as usize, size)
}
