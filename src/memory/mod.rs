//! Story-file memory map
//!
//! Byte-addressed view of the story with big-endian word access.  Reads are
//! allowed anywhere in the file; writes only below the static-memory mark.
use std::{fmt, fs::File, io::Read};

use crate::{error::*, fatal_error};

use self::header::HeaderField;

pub mod header;
pub mod reader;

pub struct Memory {
    version: u8,
    map: Vec<u8>,
    dynamic: Vec<u8>,
    static_mark: usize,
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Memory: version {}, {} bytes",
            self.version,
            self.map.len()
        )
    }
}

/// Combine two bytes into a big-endian word
pub fn word_value(hb: u8, lb: u8) -> u16 {
    (((hb as u16) << 8) & 0xFF00) + ((lb as u16) & 0xFF)
}

fn byte_values(w: u16) -> (u8, u8) {
    let hb = (w >> 8) as u8;
    let lb = w as u8;
    (hb, lb)
}

impl TryFrom<&mut File> for Memory {
    type Error = RuntimeError;

    fn try_from(value: &mut File) -> Result<Self, Self::Error> {
        let mut d = Vec::new();
        match value.read_to_end(&mut d) {
            Ok(_) => Ok(Memory::new(d)),
            Err(e) => fatal_error!(ErrorCode::System, "Error reading file: {}", e),
        }
    }
}

impl Memory {
    pub fn new(map: Vec<u8>) -> Memory {
        let version = map[0];
        let static_mark = word_value(
            map[HeaderField::StaticMark as usize],
            map[HeaderField::StaticMark as usize + 1],
        ) as usize;
        let dynamic = map[0..static_mark].to_vec();
        Memory {
            version,
            map,
            dynamic,
            static_mark,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn size(&self) -> usize {
        self.map.len()
    }

    /// Base address of static memory; writes stop here
    pub fn static_mark(&self) -> usize {
        self.static_mark
    }

    /// Pristine copy of dynamic memory, as loaded
    pub fn dynamic(&self) -> &[u8] {
        &self.dynamic
    }

    pub fn slice(&self, start: usize, length: usize) -> Vec<u8> {
        let end = usize::min(start + length, self.map.len());
        self.map[start..end].to_vec()
    }

    /// Sum the file bytes from 0x40 to the scaled file length.
    ///
    /// The dynamic region is summed from the pristine image so the result
    /// matches the header checksum even after the story has written to
    /// dynamic memory.
    pub fn checksum(&self) -> Result<u16, RuntimeError> {
        let size = self.read_word(HeaderField::FileLength as usize)? as usize
            * match self.version {
                1..=3 => 2,
                4 | 5 => 4,
                _ => 8,
            };
        if size > self.map.len() {
            return fatal_error!(
                ErrorCode::InvalidAddress,
                "File length {:#06x} beyond end of memory ({:#06x})",
                size,
                self.map.len()
            );
        }

        let mut checksum: u16 = 0;
        for i in 0x40..usize::min(self.dynamic.len(), size) {
            checksum = u16::overflowing_add(checksum, self.dynamic[i] as u16).0;
        }
        for i in self.dynamic.len()..size {
            checksum = u16::overflowing_add(checksum, self.map[i] as u16).0;
        }
        Ok(checksum)
    }

    pub fn read_byte(&self, address: usize) -> Result<u8, RuntimeError> {
        if address < self.map.len() {
            Ok(self.map[address])
        } else {
            fatal_error!(
                ErrorCode::InvalidAddress,
                "Byte address {:#06x} beyond end of memory ({:#06x})",
                address,
                self.map.len() - 1
            )
        }
    }

    pub fn read_word(&self, address: usize) -> Result<u16, RuntimeError> {
        if address < self.map.len() - 1 {
            Ok(word_value(self.map[address], self.map[address + 1]))
        } else {
            fatal_error!(
                ErrorCode::InvalidAddress,
                "Word address {:#06x} beyond end of memory ({:#06x})",
                address,
                self.map.len() - 1
            )
        }
    }

    pub fn write_byte(&mut self, address: usize, value: u8) -> Result<(), RuntimeError> {
        if address >= self.static_mark {
            fatal_error!(
                ErrorCode::IllegalMemoryAccess,
                "Write to byte address {:#06x} above dynamic memory ({:#06x})",
                address,
                self.static_mark - 1
            )
        } else {
            debug!(target: "app::memory", "Write {:#04x} to ${:04x}", value, address);
            self.map[address] = value;
            Ok(())
        }
    }

    pub fn write_word(&mut self, address: usize, value: u16) -> Result<(), RuntimeError> {
        if address + 1 >= self.static_mark {
            fatal_error!(
                ErrorCode::IllegalMemoryAccess,
                "Write to word address {:#06x} above dynamic memory ({:#06x})",
                address,
                self.static_mark - 1
            )
        } else {
            debug!(target: "app::memory", "Write {:#06x} to ${:04x}", value, address);
            let (hb, lb) = byte_values(value);
            self.map[address] = hb;
            self.map[address + 1] = lb;
            Ok(())
        }
    }

    /// Restore dynamic memory to its as-loaded state
    pub fn reset(&mut self) {
        self.map[..self.dynamic.len()].copy_from_slice(&self.dynamic)
    }

    /// Unpack a routine address
    ///
    /// # Arguments
    /// * `address` - Packed address
    ///
    /// # Returns
    /// [Result] with the unpacked byte address of the routine header or a [RuntimeError]
    pub fn packed_routine_address(&self, address: u16) -> Result<usize, RuntimeError> {
        match self.version {
            1..=3 => Ok(address as usize * 2),
            4..=5 => Ok(address as usize * 4),
            6 | 7 => Ok((address as usize * 4)
                + (self.read_word(HeaderField::RoutinesOffset as usize)? as usize * 8)),
            8 => Ok(address as usize * 8),
            _ => fatal_error!(
                ErrorCode::UnsupportedVersion,
                "Unsupported version: {}",
                self.version
            ),
        }
    }

    /// Unpack a string address
    ///
    /// # Arguments
    /// * `address` - Packed address
    ///
    /// # Returns
    /// [Result] with the unpacked byte address of the string data or a [RuntimeError]
    pub fn packed_string_address(&self, address: u16) -> Result<usize, RuntimeError> {
        match self.version {
            1..=3 => Ok(address as usize * 2),
            4..=5 => Ok(address as usize * 4),
            6 | 7 => Ok((address as usize * 4)
                + (self.read_word(HeaderField::StringsOffset as usize)? as usize * 8)),
            8 => Ok(address as usize * 8),
            _ => fatal_error!(
                ErrorCode::UnsupportedVersion,
                "Unsupported version: {}",
                self.version
            ),
        }
    }
}
