//! Fixed-offset binary layout helpers
//!
//! Account and instruction layouts are read field by field in declaration
//! order. Every read is bounds checked and reports the offset it failed at.
//! Nothing is inferred: a field's width is exactly what the caller asks for.

use crate::error::{Result, SwapError};
use solana_sdk::pubkey::Pubkey;

#[inline]
fn check(data: &[u8], offset: usize, needed: usize) -> Result<()> {
    match offset.checked_add(needed) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(SwapError::TruncatedBuffer {
            offset,
            needed,
            len: data.len(),
        }),
    }
}

/// Read a u8 at `offset`
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    check(data, offset, 1)?;
    Ok(data[offset])
}

/// Read a little-endian u16 at `offset`
#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(read_bytes(data, offset)?))
}

/// Read a little-endian u32 at `offset`
#[inline]
pub fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(read_bytes(data, offset)?))
}

/// Read a little-endian u64 at `offset`
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    Ok(u64::from_le_bytes(read_bytes(data, offset)?))
}

/// Read a little-endian u128 at `offset`
#[inline]
pub fn read_u128(data: &[u8], offset: usize) -> Result<u128> {
    Ok(u128::from_le_bytes(read_bytes(data, offset)?))
}

/// Read a 16-byte field and keep only its low 64 bits
#[inline]
pub fn read_u128_low(data: &[u8], offset: usize) -> Result<u64> {
    let bytes: [u8; 16] = read_bytes(data, offset)?;
    let mut low = [0u8; 8];
    low.copy_from_slice(&bytes[..8]);
    Ok(u64::from_le_bytes(low))
}

/// Read a 32-byte address at `offset`
#[inline]
pub fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    Ok(Pubkey::new_from_array(read_bytes(data, offset)?))
}

/// Read a fixed-size byte array at `offset`
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    check(data, offset, N)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..offset + N]);
    Ok(bytes)
}

/// Sequential reader with a tracked offset
pub struct LayoutReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> LayoutReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    /// Read a u8 flag; any nonzero byte is true
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let val = read_u16(self.data, self.offset)?;
        self.offset += 2;
        Ok(val)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let val = read_u32(self.data, self.offset)?;
        self.offset += 4;
        Ok(val)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_u128(&mut self) -> Result<u128> {
        let val = read_u128(self.data, self.offset)?;
        self.offset += 16;
        Ok(val)
    }

    /// Read a 16-byte field, keep the low 64 bits, advance 16 bytes
    #[inline]
    pub fn read_u128_low(&mut self) -> Result<u64> {
        let val = read_u128_low(self.data, self.offset)?;
        self.offset += 16;
        Ok(val)
    }

    #[inline]
    pub fn read_pubkey(&mut self) -> Result<Pubkey> {
        let val = read_pubkey(self.data, self.offset)?;
        self.offset += 32;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    /// Read `N` consecutive u64 values
    pub fn read_u64_array<const N: usize>(&mut self) -> Result<[u64; N]> {
        let mut out = [0u64; N];
        for slot in out.iter_mut() {
            *slot = self.read_u64()?;
        }
        Ok(out)
    }

    /// Read a C-style `COption<Pubkey>` (u32 tag + 32 bytes)
    pub fn read_option_pubkey(&mut self) -> Result<Option<Pubkey>> {
        let tag = self.read_u32()?;
        let key = self.read_pubkey()?;
        Ok((tag != 0).then_some(key))
    }

    /// Read a C-style `COption<u64>` (u32 tag + 8 bytes)
    pub fn read_option_u64(&mut self) -> Result<Option<u64>> {
        let tag = self.read_u32()?;
        let val = self.read_u64()?;
        Ok((tag != 0).then_some(val))
    }
}

/// Sequential little-endian writer, the inverse of [`LayoutReader`]
#[derive(Debug, Default)]
pub struct LayoutWriter {
    buf: Vec<u8>,
}

impl LayoutWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(len),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_bool(&mut self, val: bool) {
        self.buf.push(u8::from(val));
    }

    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u128(&mut self, val: u128) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Write a 64-bit value into a 16-byte field, zero-padding the high half
    pub fn write_u128_low(&mut self, val: u64) {
        self.write_u128(u128::from(val));
    }

    pub fn write_pubkey(&mut self, key: &Pubkey) {
        self.buf.extend_from_slice(key.as_ref());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u64_array(&mut self, vals: &[u64]) {
        for val in vals {
            self.write_u64(*val);
        }
    }

    pub fn write_option_pubkey(&mut self, key: Option<&Pubkey>) {
        match key {
            Some(key) => {
                self.write_u32(1);
                self.write_pubkey(key);
            }
            None => {
                self.write_u32(0);
                self.write_pubkey(&Pubkey::default());
            }
        }
    }

    pub fn write_option_u64(&mut self, val: Option<u64>) {
        self.write_u32(u32::from(val.is_some()));
        self.write_u64(val.unwrap_or(0));
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// A record with a fixed binary layout of exactly `LEN` bytes
pub trait Layout: Sized {
    /// Total span in bytes
    const LEN: usize;

    /// Read the fields in declaration order
    fn unpack(reader: &mut LayoutReader<'_>) -> Result<Self>;

    /// Write the fields in declaration order
    fn pack(&self, writer: &mut LayoutWriter);

    /// Decode from the start of `data`; trailing bytes are ignored
    fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(SwapError::TruncatedBuffer {
                offset: 0,
                needed: Self::LEN,
                len: data.len(),
            });
        }
        let mut reader = LayoutReader::new(&data[..Self::LEN]);
        Self::unpack(&mut reader)
    }

    /// Encode into a fresh buffer of `LEN` bytes
    fn encode(&self) -> Vec<u8> {
        let mut writer = LayoutWriter::with_capacity(Self::LEN);
        self.pack(&mut writer);
        writer.into_inner()
    }
}
