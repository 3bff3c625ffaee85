//! CRC8 (Dallas/Maxim 1-Wire) used to protect EEPROM records

/// Reflected form of the polynomial x^8 + x^5 + x^4 + 1
const POLY: u8 = 0x8C;

/// Calculate the Dallas/Maxim CRC8 of `data` (init 0, no final xor)
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut current = byte;
        for _ in 0..8 {
            let mix = (crc ^ current) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= POLY;
            }
            current >>= 1;
        }
    }
    crc
}
