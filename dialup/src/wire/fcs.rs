//! The 16-bit frame check sequence of RFC 1662.
//!
//! A reflected CRC-CCITT (polynomial `0x8408`) seeded with all ones. The complement of the final
//! register value is transmitted least significant octet first. Running the register over a frame
//! including its transmitted check sequence yields the constant [`GOOD`] residue.
//!
//! [`GOOD`]: constant.GOOD.html

/// Initial value of the register.
pub const INIT: u16 = 0xffff;

/// The residue of a frame that includes its correct check sequence.
pub const GOOD: u16 = 0xf0b8;

/// Length of the check sequence trailer in octets.
pub const LEN: usize = 2;

const POLYNOMIAL: u16 = 0x8408;

static TABLE: [u16; 256] = table();

const fn table() -> [u16; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        let mut value = i as u16;
        let mut bit = 0;
        while bit < 8 {
            value = if value & 1 != 0 {
                (value >> 1) ^ POLYNOMIAL
            } else {
                value >> 1
            };
            bit += 1;
        }
        table[i] = value;
        i += 1;
    }
    table
}

/// Advance the register over some more data.
pub fn update(fcs: u16, data: &[u8]) -> u16 {
    data.iter().fold(fcs, |fcs, &byte| {
        (fcs >> 8) ^ TABLE[usize::from((fcs ^ u16::from(byte)) as u8)]
    })
}

/// Compute the check sequence to transmit after `data`.
pub fn fcs16(data: &[u8]) -> u16 {
    !update(INIT, data)
}

/// Validate data that ends in its transmitted check sequence.
pub fn check(data: &[u8]) -> bool {
    data.len() >= LEN && update(INIT, data) == GOOD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        // The standard check input of CRC-16/X-25.
        assert_eq!(fcs16(b"123456789"), 0x906e);
    }

    #[test]
    fn incremental() {
        let data = b"\xff\x03\xc0\x21\x01\x01\x00\x04";
        let (head, tail) = data.split_at(3);
        assert_eq!(!update(update(INIT, head), tail), fcs16(data));
    }

    #[test]
    fn residue() {
        let inputs: [&[u8]; 4] = [
            b"",
            b"\x7e",
            b"\xff\x03\xc0\x21\x09\x00\x00\x08\x12\x34\x56\x78",
            &[0u8; 300],
        ];

        for input in inputs.iter() {
            let mut data = input.to_vec();
            data.extend_from_slice(&fcs16(input).to_le_bytes());
            assert_eq!(update(INIT, &data), GOOD);
            assert!(check(&data));

            let last = data.len() - 1;
            data[last] ^= 0x01;
            assert!(!check(&data));
        }
    }
}
