//! Byte-addressable persistent storage
//!
//! Models the ATmega32U4's on-chip EEPROM: erased cells read 0xFF and every
//! cell has a limited number of write cycles.

use fanboy_core::{FanBoyError, Result};

/// EEPROM access trait
pub trait Eeprom {
    /// Capacity in bytes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()>;
}

fn check_range(len: usize, offset: usize, count: usize) -> Result<()> {
    match offset.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(FanBoyError::Eeprom(format!(
            "access of {} bytes at offset {} exceeds {} byte EEPROM",
            count, offset, len
        ))),
    }
}

/// RAM-backed EEPROM with per-cell wear counters
///
/// Writes use update semantics: a cell that already holds the value is not
/// rewritten and its counter does not move.
#[derive(Debug, Clone)]
pub struct MemoryEeprom {
    cells: Vec<u8>,
    writes: Vec<u32>,
}

impl MemoryEeprom {
    /// Fully erased EEPROM of `len` bytes
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0xFF; len],
            writes: vec![0; len],
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Number of physical writes to one cell
    pub fn write_count(&self, offset: usize) -> u32 {
        self.writes.get(offset).copied().unwrap_or(0)
    }

    /// Highest write count of any cell
    pub fn max_wear(&self) -> u32 {
        self.writes.iter().copied().max().unwrap_or(0)
    }

    /// Invert one bit, bypassing wear accounting (bit-rot)
    pub fn flip_bit(&mut self, offset: usize, bit: u8) {
        if let Some(cell) = self.cells.get_mut(offset) {
            *cell ^= 1 << (bit & 0x07);
        }
    }
}

impl Eeprom for MemoryEeprom {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(self.cells.len(), offset, buf.len())?;
        buf.copy_from_slice(&self.cells[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(self.cells.len(), offset, data.len())?;
        for (i, &byte) in data.iter().enumerate() {
            if self.cells[offset + i] != byte {
                self.cells[offset + i] = byte;
                self.writes[offset + i] += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_eeprom_is_erased() {
        let eeprom = MemoryEeprom::new(64);
        assert_eq!(eeprom.len(), 64);
        assert!(eeprom.as_bytes().iter().all(|b| *b == 0xFF));
        assert_eq!(eeprom.max_wear(), 0);
    }

    #[test]
    fn test_write_then_read() {
        let mut eeprom = MemoryEeprom::new(32);
        eeprom.write(10, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 5];
        eeprom.read(9, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 1, 2, 3, 0xFF]);
    }

    #[test]
    fn test_update_semantics_for_wear() {
        let mut eeprom = MemoryEeprom::new(8);
        eeprom.write(0, &[7, 7]).unwrap();
        eeprom.write(0, &[7, 8]).unwrap();

        assert_eq!(eeprom.write_count(0), 1);
        assert_eq!(eeprom.write_count(1), 2);
        assert_eq!(eeprom.write_count(2), 0);
    }

    #[test]
    fn test_out_of_range_access() {
        let mut eeprom = MemoryEeprom::new(16);
        let mut buf = [0u8; 4];
        assert!(matches!(
            eeprom.read(14, &mut buf),
            Err(FanBoyError::Eeprom(_))
        ));
        assert!(eeprom.write(16, &[0]).is_err());
        assert!(eeprom.write(usize::MAX, &[0]).is_err());
    }

    #[test]
    fn test_flip_bit() {
        let mut eeprom = MemoryEeprom::new(4);
        eeprom.flip_bit(2, 0);
        assert_eq!(eeprom.as_bytes()[2], 0xFE);
        assert_eq!(eeprom.write_count(2), 0);
    }
}
