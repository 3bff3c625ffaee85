//! Wear-rotated, CRC-protected configuration storage
//!
//! EEPROM layout:
//!
//! ```text
//! 0..15    unused
//! 15       generation index: slot holding the latest record
//! 16..     slots of PersistedRecord::SIZE bytes (18 on a 1 kB part)
//! ```
//!
//! A save writes the whole record into the slot after the current one and
//! only then moves the generation index. Power loss during the record write
//! leaves the index on the previous, intact record.

use fanboy_core::protocol::Wire;
use fanboy_core::{Configuration, FanBoyError, Result};
use tracing::{debug, warn};

use crate::crc8::crc8;
use crate::eeprom::Eeprom;

/// First byte of every valid record
pub const EEPROM_MAGIC: u8 = 0xFB;

/// Offset of the generation index byte
pub const GENERATION_OFFSET: usize = 15;

/// Offset of slot 0
pub const SLOTS_OFFSET: usize = GENERATION_OFFSET + 1;

/// On-EEPROM record: magic, configuration, CRC8 over the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedRecord {
    pub config: Configuration,
}

impl PersistedRecord {
    pub const SIZE: usize = 1 + Configuration::SIZE + 1;

    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = self.config.to_bytes();
        let mut bytes = Vec::with_capacity(Self::SIZE);
        bytes.push(EEPROM_MAGIC);
        bytes.extend_from_slice(&body);
        bytes.push(crc8(&body));
        bytes
    }

    /// Accept a record only if magic, CRC and layout all check out
    pub fn verify(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(FanBoyError::ConfigNotFound);
        }
        let body = &bytes[1..Self::SIZE - 1];
        if bytes[0] != EEPROM_MAGIC {
            debug!("Record magic mismatch: 0x{:02X}", bytes[0]);
            return Err(FanBoyError::ConfigNotFound);
        }
        if crc8(body) != bytes[Self::SIZE - 1] {
            warn!("Record CRC mismatch");
            return Err(FanBoyError::ConfigNotFound);
        }
        let config = Configuration::from_bytes(body).map_err(|e| {
            warn!("Record passed CRC but does not decode: {}", e);
            FanBoyError::ConfigNotFound
        })?;
        Ok(Self { config })
    }
}

/// Configuration store on top of an [`Eeprom`]
#[derive(Debug)]
pub struct ConfigStore<E: Eeprom> {
    eeprom: E,
    slots: usize,
}

impl<E: Eeprom> ConfigStore<E> {
    /// Fails if the EEPROM cannot hold a single slot
    pub fn new(eeprom: E) -> Result<Self> {
        let slots = eeprom.len().saturating_sub(SLOTS_OFFSET) / PersistedRecord::SIZE;
        if slots == 0 {
            return Err(FanBoyError::Eeprom(format!(
                "{} byte EEPROM cannot hold a {} byte record",
                eeprom.len(),
                PersistedRecord::SIZE
            )));
        }
        // The generation index is a single byte
        let slots = slots.min(u8::MAX as usize);
        Ok(Self { eeprom, slots })
    }

    pub fn slot_count(&self) -> usize {
        self.slots
    }

    pub fn slot_offset(&self, slot: usize) -> usize {
        SLOTS_OFFSET + slot * PersistedRecord::SIZE
    }

    /// Slot of the latest record, `None` when the index is erased or invalid
    pub fn current_slot(&self) -> Result<Option<usize>> {
        let mut index = [0u8; 1];
        self.eeprom.read(GENERATION_OFFSET, &mut index)?;
        let slot = index[0] as usize;
        Ok((slot < self.slots).then_some(slot))
    }

    /// Persist `config` into the next slot; returns the slot written
    pub fn save(&mut self, config: &Configuration) -> Result<usize> {
        let next = match self.current_slot()? {
            Some(slot) => (slot + 1) % self.slots,
            None => 0,
        };

        let record = PersistedRecord::new(*config).encode();
        self.eeprom.write(self.slot_offset(next), &record)?;
        self.eeprom.write(GENERATION_OFFSET, &[next as u8])?;

        debug!("Configuration saved to slot {}", next);
        Ok(next)
    }

    /// Read the latest record; anything invalid is [`FanBoyError::ConfigNotFound`]
    pub fn load(&self) -> Result<Configuration> {
        let slot = self.current_slot()?.ok_or(FanBoyError::ConfigNotFound)?;

        let mut bytes = vec![0u8; PersistedRecord::SIZE];
        self.eeprom.read(self.slot_offset(slot), &mut bytes)?;
        let record = PersistedRecord::verify(&bytes)?;

        debug!("Configuration loaded from slot {}", slot);
        Ok(record.config)
    }

    pub fn eeprom(&self) -> &E {
        &self.eeprom
    }

    pub fn eeprom_mut(&mut self) -> &mut E {
        &mut self.eeprom
    }

    pub fn into_inner(self) -> E {
        self.eeprom
    }
}
