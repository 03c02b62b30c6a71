//! Fixed 32-byte header codec.
//!
//! Layout (little-endian):
//! `[magic:4][version:u16][encoding_len:u8][encoding:8][element_size:u32][length:u64][reserved:5]`

use std::io::{Read, Seek, SeekFrom, Write};

use crate::constants::{
    ENCODING_SLOT_LEN, FORMAT_VERSION, HEADER_SIZE, MAGIC, OFFSET_ELEMENT_SIZE,
    OFFSET_ENCODING, OFFSET_ENCODING_LEN, OFFSET_LENGTH, OFFSET_RESERVED, OFFSET_VERSION,
};
use crate::error::{ArrayFileError, Result};
use crate::types::Header;

pub struct HeaderCodec;

impl HeaderCodec {
    /// Serialize `header`. The descriptor is truncated to its slot and zero-padded; reserved
    /// bytes are always zero.
    #[must_use]
    pub fn encode(header: &Header) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let descriptor = header.encoding.as_bytes();
        let descriptor = &descriptor[..descriptor.len().min(ENCODING_SLOT_LEN)];

        buf[..OFFSET_VERSION].copy_from_slice(&header.magic);
        buf[OFFSET_VERSION..OFFSET_ENCODING_LEN].copy_from_slice(&header.version.to_le_bytes());
        #[allow(clippy::cast_possible_truncation)]
        let encoding_len = descriptor.len() as u8;
        buf[OFFSET_ENCODING_LEN] = encoding_len;
        buf[OFFSET_ENCODING..OFFSET_ENCODING + descriptor.len()].copy_from_slice(descriptor);
        buf[OFFSET_ELEMENT_SIZE..OFFSET_LENGTH].copy_from_slice(&header.element_size.to_le_bytes());
        buf[OFFSET_LENGTH..OFFSET_RESERVED].copy_from_slice(&header.length.to_le_bytes());
        buf
    }

    /// Decode and validate magic, version and descriptor. Reserved bytes are ignored.
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Result<Header> {
        if buf[..OFFSET_VERSION] != MAGIC {
            return Err(ArrayFileError::InvalidHeader {
                reason: "magic mismatch".into(),
            });
        }
        let version = u16::from_le_bytes([buf[OFFSET_VERSION], buf[OFFSET_VERSION + 1]]);
        if version != FORMAT_VERSION {
            return Err(ArrayFileError::UnsupportedVersion {
                found: version,
                expected: FORMAT_VERSION,
            });
        }

        let encoding_len = buf[OFFSET_ENCODING_LEN] as usize;
        if encoding_len > ENCODING_SLOT_LEN {
            return Err(ArrayFileError::InvalidHeader {
                reason: "encoding length exceeds descriptor slot".into(),
            });
        }
        let descriptor = &buf[OFFSET_ENCODING..OFFSET_ENCODING + encoding_len];
        if !descriptor.is_ascii() {
            return Err(ArrayFileError::InvalidHeader {
                reason: "encoding descriptor is not ASCII".into(),
            });
        }
        let encoding = String::from_utf8_lossy(descriptor).into_owned();

        let mut size_bytes = [0u8; 4];
        size_bytes.copy_from_slice(&buf[OFFSET_ELEMENT_SIZE..OFFSET_LENGTH]);
        let mut length_bytes = [0u8; 8];
        length_bytes.copy_from_slice(&buf[OFFSET_LENGTH..OFFSET_RESERVED]);

        Ok(Header {
            magic: MAGIC,
            version,
            encoding,
            element_size: u32::from_le_bytes(size_bytes),
            length: u64::from_le_bytes(length_bytes),
        })
    }

    /// Overwrite bytes `[0, HEADER_SIZE)` and flush.
    pub fn write<W: Write + Seek>(file: &mut W, header: &Header) -> Result<()> {
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&Self::encode(header))?;
        file.flush()?;
        Ok(())
    }

    /// Read the header at offset 0.
    ///
    /// Returns `Ok(None)` when fewer than `HEADER_SIZE` bytes exist; any validation failure on a
    /// full-length header is an error.
    pub fn read<R: Read + Seek>(file: &mut R) -> Result<Option<Header>> {
        file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::with_capacity(HEADER_SIZE);
        file.take(HEADER_SIZE as u64).read_to_end(&mut buf)?;
        let Ok(bytes) = <[u8; HEADER_SIZE]>::try_from(buf.as_slice()) else {
            return Ok(None);
        };
        Self::decode(&bytes).map(Some)
    }
}
