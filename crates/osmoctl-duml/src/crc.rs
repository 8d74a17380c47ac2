//! Checksums used by the DUML framing layer.
//!
//! Both checksums are bit-reflected (reflected input and output, no final
//! XOR). CRC8 covers the first three header bytes; CRC16 covers the whole
//! frame up to the checksum itself.
//!
//! Canonical parameters:
//! - CRC8:  polynomial 0x31, initial value 0xEE
//! - CRC16: polynomial 0x1021, initial value 0x496C
//!
//! The tables are built at compile time over the reflected polynomial and
//! the register runs LSB-first, so the reflected initial values below are
//! what an empty input hashes to.

pub const CRC8_POLY: u8 = 0x31;
pub const CRC8_INIT: u8 = 0xEE;

pub const CRC16_POLY: u16 = 0x1021;
pub const CRC16_INIT: u16 = 0x496C;

const fn reflect8(mut v: u8) -> u8 {
    let mut r = 0u8;
    let mut i = 0;
    while i < 8 {
        r = (r << 1) | (v & 1);
        v >>= 1;
        i += 1;
    }
    r
}

const fn reflect16(mut v: u16) -> u16 {
    let mut r = 0u16;
    let mut i = 0;
    while i < 16 {
        r = (r << 1) | (v & 1);
        v >>= 1;
        i += 1;
    }
    r
}

const fn build_table8(poly_reflected: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut n = 0;
    while n < 256 {
        let mut crc = n as u8;
        let mut i = 0;
        while i < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ poly_reflected
            } else {
                crc >> 1
            };
            i += 1;
        }
        table[n] = crc;
        n += 1;
    }
    table
}

const fn build_table16(poly_reflected: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut n = 0;
    while n < 256 {
        let mut crc = n as u16;
        let mut i = 0;
        while i < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ poly_reflected
            } else {
                crc >> 1
            };
            i += 1;
        }
        table[n] = crc;
        n += 1;
    }
    table
}

const CRC8_TABLE: [u8; 256] = build_table8(reflect8(CRC8_POLY));
const CRC16_TABLE: [u16; 256] = build_table16(reflect16(CRC16_POLY));

/// CRC8 over the given bytes.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = reflect8(CRC8_INIT);
    for &b in data {
        crc = CRC8_TABLE[(crc ^ b) as usize];
    }
    crc
}

/// CRC16 over the given bytes.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = reflect16(CRC16_INIT);
    for &b in data {
        crc = (crc >> 8) ^ CRC16_TABLE[((crc ^ b as u16) & 0xFF) as usize];
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    // Header checksums taken from captured frames.
    #[test]
    fn crc8_known_vectors() {
        assert_eq!(crc8(&[0x55, 0x1b, 0x04]), 0x75);
        assert_eq!(crc8(&[0x55, 0x12, 0x04]), 0xC7);
        assert_eq!(crc8(&[0x55, 0x11, 0x04]), 0x92);
        assert_eq!(crc8(&[0x55, 0x0d, 0x04]), 0x33);
        assert_eq!(crc8(&[0x55, 0x1f, 0x04]), 0x4e);
    }

    #[test]
    fn crc8_empty_is_reflected_init() {
        assert_eq!(crc8(&[]), reflect8(CRC8_INIT));
        assert_eq!(crc8(&[]), 0x77);
    }

    #[test]
    fn crc16_empty_is_reflected_init() {
        assert_eq!(crc16(&[]), reflect16(CRC16_INIT));
        assert_eq!(crc16(&[]), 0x3692);
    }

    #[test]
    fn crc16_known_frame_tail() {
        // Reference frame 55110492021bfd944007450000000031d7: the trailing
        // two bytes are the little-endian CRC16 of everything before them.
        let frame: &[u8] = &[
            0x55, 0x11, 0x04, 0x92, 0x02, 0x1b, 0xfd, 0x94, 0x40, 0x07, 0x45, 0x00, 0x00, 0x00,
            0x00,
        ];
        assert_eq!(crc16(frame), 0xD731);
    }

    #[test]
    fn crc8_detects_single_bit_flips() {
        let sample = [0x55u8, 0x1b, 0x04, 0xAA, 0x00, 0xFF];
        let reference = crc8(&sample);
        for byte_idx in 0..sample.len() {
            for bit in 0..8 {
                let mut flipped = sample;
                flipped[byte_idx] ^= 1 << bit;
                assert_ne!(crc8(&flipped), reference, "flip at {byte_idx}:{bit}");
            }
        }
    }

    #[test]
    fn crc16_detects_single_bit_flips() {
        let sample = [0x55u8, 0x11, 0x04, 0x92, 0x02, 0x1b, 0xfd, 0x94];
        let reference = crc16(&sample);
        for byte_idx in 0..sample.len() {
            for bit in 0..8 {
                let mut flipped = sample;
                flipped[byte_idx] ^= 1 << bit;
                assert_ne!(crc16(&flipped), reference, "flip at {byte_idx}:{bit}");
            }
        }
    }
}
