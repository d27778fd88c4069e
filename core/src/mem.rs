//! Command memory for GE display lists.

use memmap2::{MmapMut, MmapOptions};

use crate::config::PAGE_SIZE;
use crate::error::{Error, Result};
use crate::round_up;

/// A flat region of guest memory starting at `base`.
#[derive(Debug)]
pub struct GeMemory {
    // [base, base + len)
    base: u32,
    len: usize,
    host_mmap: MmapMut,
}

impl GeMemory {
    /// Maps `len` zeroed bytes at `base`. The region must be non-empty and fit the 32-bit space.
    pub fn new(base: u32, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::OutOfBounds);
        }
        if base as u64 + len as u64 > u32::MAX as u64 + 1 {
            return Err(Error::OutOfBounds);
        }

        let m_len = round_up!(len, PAGE_SIZE);
        let host_mmap = MmapOptions::new()
            .len(m_len)
            .map_anon()
            .map_err(|e| {
                warn!("Failed to create memory map: {}", e);
                Error::InternalError(format!("Failed to create memory map: {}", e))
            })?;

        Ok(Self { base, len, host_mmap })
    }

    /// Maps `data` at `base`. Empty input still gets one word so reads at `base` succeed.
    pub fn from_bytes(base: u32, data: &[u8]) -> Result<Self> {
        let mut mem = Self::new(base, data.len().max(4))?;
        mem.host_mmap[..data.len()].copy_from_slice(data);
        Ok(mem)
    }

    pub fn from_words(base: u32, words: &[u32]) -> Result<Self> {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Self::from_bytes(base, &bytes)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    /// Mapped size in bytes, never zero.
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn contains(&self, gaddr: u32) -> bool {
        gaddr >= self.base && ((gaddr - self.base) as usize) < self.len
    }

    fn offset(&self, gaddr: u32, size: usize) -> Result<usize> {
        if !self.contains(gaddr) {
            return Err(Error::MemAccessFault(gaddr));
        }
        let offset = (gaddr - self.base) as usize;
        if offset + size > self.len {
            return Err(Error::MemAccessFault(gaddr));
        }
        Ok(offset)
    }

    pub fn read_u32(&self, gaddr: u32) -> Result<u32> {
        let offset = self.offset(gaddr, 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.host_mmap[offset..offset + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn write_u32(&mut self, gaddr: u32, value: u32) -> Result<()> {
        let offset = self.offset(gaddr, 4)?;
        self.host_mmap[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log;

    #[test]
    fn test_rw_words() {
        log::log_init(log::Level::Off);

        let mut mem = GeMemory::from_words(0x0880_0000, &[0x0400_0003, 0x0C00_0000]).expect("Failed to map");
        assert_eq!(mem.read_u32(0x0880_0000).unwrap(), 0x0400_0003);
        assert_eq!(mem.read_u32(0x0880_0004).unwrap(), 0x0C00_0000);

        mem.write_u32(0x0880_0004, 0x1200_0001).expect("Failed to write u32");
        assert_eq!(mem.read_u32(0x0880_0004).unwrap(), 0x1200_0001);
    }

    #[test]
    fn test_out_of_range() {
        log::log_init(log::Level::Off);

        let mem = GeMemory::from_words(0x1000, &[0, 0]).unwrap();
        assert!(matches!(mem.read_u32(0x0ffc), Err(Error::MemAccessFault(0x0ffc))));
        assert!(matches!(mem.read_u32(0x1008), Err(Error::MemAccessFault(0x1008))));
        // Straddles the end.
        assert!(matches!(mem.read_u32(0x1006), Err(Error::MemAccessFault(0x1006))));
        assert!(matches!(GeMemory::new(0xFFFF_FFF0, 0x20), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_empty_region_rejected() {
        log::log_init(log::Level::Off);

        assert!(matches!(GeMemory::new(0x1000, 0), Err(Error::OutOfBounds)));
        // An empty image still maps one readable word.
        let mem = GeMemory::from_bytes(0x1000, &[]).unwrap();
        assert_eq!(mem.size(), 4);
        assert_eq!(mem.read_u32(0x1000).unwrap(), 0);
    }
}
