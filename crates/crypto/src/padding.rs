//! Block padding schemes: PKCS#7, ISO/IEC 7816-4 and ISO 10126.
//!
//! Padding always adds between 1 and `block_size` bytes, so input that is
//! already block aligned gains a whole block and the padding stays
//! unambiguous. Block sizes are limited to `1..=255` because the padding
//! length has to fit in one byte.

use gantry_common::Kind;

use crate::{
    error::{PADDING, Result, UNPADDING},
    random,
};

/// A block padding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    Pkcs7,
    Iso7816,
    Iso10126,
}

impl Padding {
    pub fn pad(self, block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Pkcs7 => pkcs7_pad(block_size, data),
            Self::Iso7816 => iso7816_pad(block_size, data),
            Self::Iso10126 => iso10126_pad(block_size, data),
        }
    }

    pub fn unpad(self, block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Pkcs7 => pkcs7_unpad(block_size, data),
            Self::Iso7816 => iso7816_unpad(block_size, data),
            Self::Iso10126 => iso10126_unpad(block_size, data),
        }
    }
}

fn check_block_size(kind: Kind, block_size: usize) -> Result<()> {
    if (1..=255).contains(&block_size) {
        Ok(())
    } else {
        Err(kind.with_detail(format!(
            "block size must be in [1,255], got {block_size}"
        )))
    }
}

/// Number of padding bytes to append, in `1..=block_size`.
fn pad_len(block_size: usize, data: &[u8]) -> Result<usize> {
    check_block_size(PADDING, block_size)?;
    Ok(block_size - data.len() % block_size)
}

fn check_padded(block_size: usize, data: &[u8]) -> Result<()> {
    check_block_size(UNPADDING, block_size)?;
    if data.len() < block_size || data.len() % block_size != 0 {
        return Err(UNPADDING.with_detail(format!(
            "data length {} is not a positive multiple of block size {block_size}",
            data.len()
        )));
    }
    Ok(())
}

/// Strip the number of bytes named by the final byte.
fn strip_counted(data: &[u8]) -> Result<Vec<u8>> {
    let n = usize::from(data[data.len() - 1]);
    if n > data.len() {
        return Err(UNPADDING.with_detail(format!(
            "padding length {n} exceeds data length {}",
            data.len()
        )));
    }
    Ok(data[..data.len() - n].to_vec())
}

/// Append `n` copies of the byte `n`.
pub fn pkcs7_pad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    let n = pad_len(block_size, data)?;
    let mut out = Vec::with_capacity(data.len() + n);
    out.extend_from_slice(data);
    out.resize(data.len() + n, n as u8);
    Ok(out)
}

pub fn pkcs7_unpad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    check_padded(block_size, data)?;
    strip_counted(data)
}

/// Append `0x80` followed by zero bytes.
pub fn iso7816_pad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    let n = pad_len(block_size, data)?;
    let mut out = Vec::with_capacity(data.len() + n);
    out.extend_from_slice(data);
    out.push(0x80);
    out.resize(data.len() + n, 0x00);
    Ok(out)
}

pub fn iso7816_unpad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    check_padded(block_size, data)?;
    for i in (data.len() - block_size..data.len()).rev() {
        match data[i] {
            0x00 => continue,
            0x80 => return Ok(data[..i].to_vec()),
            b => {
                return Err(UNPADDING.with_detail(format!(
                    "unexpected byte {b:#04x} in ISO 7816-4 padding"
                )));
            },
        }
    }
    Err(UNPADDING.with_detail("ISO 7816-4 padding marker not found"))
}

/// Append `n - 1` random bytes followed by the byte `n`.
pub fn iso10126_pad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    let n = pad_len(block_size, data)?;
    let mut out = Vec::with_capacity(data.len() + n);
    out.extend_from_slice(data);
    out.resize(data.len() + n - 1, 0x00);
    random::fill(&mut out[data.len()..]).map_err(|e| PADDING.wrap(e))?;
    out.push(n as u8);
    Ok(out)
}

pub fn iso10126_unpad(block_size: usize, data: &[u8]) -> Result<Vec<u8>> {
    check_padded(block_size, data)?;
    strip_counted(data)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::random::{Entropy, EntropyError, FixedEntropy, with_source},
        rstest::rstest,
    };

    const ALL: [Padding; 3] = [Padding::Pkcs7, Padding::Iso7816, Padding::Iso10126];

    struct BrokenEntropy;

    impl Entropy for BrokenEntropy {
        fn fill(&self, _dest: &mut [u8]) -> std::result::Result<(), EntropyError> {
            Err(EntropyError::Other("unavailable".into()))
        }
    }

    #[test]
    fn pkcs7_known_vector() {
        let padded = pkcs7_pad(6, b"aac").unwrap();
        assert_eq!(padded, [0x61, 0x61, 0x63, 0x03, 0x03, 0x03]);
        assert_eq!(pkcs7_unpad(6, &padded).unwrap(), b"aac");
    }

    #[test]
    fn iso7816_known_vector() {
        let padded = iso7816_pad(6, b"aac").unwrap();
        assert_eq!(padded, [0x61, 0x61, 0x63, 0x80, 0x00, 0x00]);
        assert_eq!(iso7816_unpad(6, &padded).unwrap(), b"aac");
    }

    #[test]
    fn iso10126_uses_random_filler() {
        let padded = with_source(FixedEntropy::new(*b"xy"), || iso10126_pad(6, b"aac")).unwrap();
        assert_eq!(padded, [0x61, 0x61, 0x63, b'x', b'y', 0x03]);
        assert_eq!(iso10126_unpad(6, &padded).unwrap(), b"aac");
    }

    #[test]
    fn iso10126_random_failure_is_padding_error() {
        let err = with_source(BrokenEntropy, || iso10126_pad(8, b"abc")).unwrap_err();
        assert_eq!(err, PADDING);
    }

    #[test]
    fn aligned_input_gets_full_block() {
        for padding in ALL {
            let padded = padding.pad(4, b"abcd").unwrap();
            assert_eq!(padded.len(), 8, "{padding:?}");
            assert_eq!(padding.unpad(4, &padded).unwrap(), b"abcd");
        }
        assert_eq!(&pkcs7_pad(4, b"abcd").unwrap()[4..], [4, 4, 4, 4]);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(8)]
    #[case(16)]
    #[case(255)]
    fn round_trip_and_length(#[case] block_size: usize) {
        for padding in ALL {
            for len in [0usize, 1, block_size - 1, block_size, block_size + 3, 300] {
                let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
                let padded = padding.pad(block_size, &data).unwrap();
                assert!(padded.len() > data.len());
                assert_eq!(padded.len() % block_size, 0);
                assert_eq!(padding.unpad(block_size, &padded).unwrap(), data);
            }
        }
    }

    #[rstest]
    #[case(0)]
    #[case(256)]
    fn pad_rejects_block_size(#[case] block_size: usize) {
        for padding in ALL {
            assert_eq!(padding.pad(block_size, b"data").unwrap_err(), PADDING);
        }
    }

    #[test]
    fn unpad_rejects_block_size() {
        for padding in ALL {
            assert_eq!(padding.unpad(0, b"data").unwrap_err(), UNPADDING);
            assert_eq!(padding.unpad(256, b"data").unwrap_err(), UNPADDING);
        }
    }

    #[test]
    fn unpad_rejects_bad_lengths() {
        for padding in ALL {
            assert_eq!(padding.unpad(8, b"").unwrap_err(), UNPADDING);
            assert_eq!(padding.unpad(8, b"short").unwrap_err(), UNPADDING);
            assert_eq!(padding.unpad(4, b"abcdef").unwrap_err(), UNPADDING);
        }
    }

    #[test]
    fn unpad_rejects_oversized_count() {
        let err = pkcs7_unpad(4, &[1, 2, 3, 9]).unwrap_err();
        assert_eq!(err, UNPADDING);
        let err = iso10126_unpad(4, &[1, 2, 3, 200]).unwrap_err();
        assert_eq!(err, UNPADDING);
    }

    #[test]
    fn pkcs7_zero_count_strips_nothing() {
        assert_eq!(pkcs7_unpad(4, &[1, 2, 3, 0]).unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn iso7816_rejects_missing_marker() {
        assert_eq!(
            iso7816_unpad(4, &[1, 0, 0, 0]).unwrap_err(),
            UNPADDING
        );
        assert_eq!(
            iso7816_unpad(4, &[0, 0, 0, 0]).unwrap_err(),
            UNPADDING
        );
    }

    #[test]
    fn iso7816_scan_is_limited_to_one_block() {
        // Marker sits in the previous block, beyond the scan window.
        let data = [0x80, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(iso7816_unpad(4, &data).unwrap_err(), UNPADDING);
    }
}
