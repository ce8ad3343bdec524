//! Constant-data allocator.
//!
//! A bump allocator over the target's linear address space. Addresses are
//! handed out monotonically and never reused: every reservation starts at or
//! after the end of the previous one, rounded up to the requested alignment.

use ember_diagnostic::{CompileError, CompileResult};
use rustc_hash::FxHashMap;

/// Default first data address. Address 0 stays free as a null pointer.
pub const DEFAULT_DATA_BASE: u32 = 16;

/// Size of a string header: `{ length: i32, data: i32 }`.
pub const STRING_HEADER_SIZE: u32 = 8;

/// A run of initialised bytes at a fixed address.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DataBlock {
    pub address: u32,
    pub bytes: Vec<u8>,
}

impl DataBlock {
    /// One past the last byte of this block.
    pub fn end(&self) -> u64 {
        u64::from(self.address) + self.bytes.len() as u64
    }
}

/// Per-module constant data: interned string bytes, string headers and
/// literal blocks.
#[derive(Clone, PartialEq, Debug)]
pub struct DataAllocator {
    base: u32,
    cursor: u32,
    /// content -> address of its bytes
    interned: FxHashMap<String, u32>,
    /// content -> address of its header
    headers: FxHashMap<String, u32>,
    /// Interned string contents in allocation order.
    strings: Vec<DataBlock>,
    /// Headers and literal blocks in allocation order.
    blocks: Vec<DataBlock>,
}

impl Default for DataAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_BASE)
    }
}

impl DataAllocator {
    pub fn new(base: u32) -> Self {
        DataAllocator {
            base,
            cursor: base,
            interned: FxHashMap::default(),
            headers: FxHashMap::default(),
            strings: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Address the first reservation was made from.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Next free address.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Reserve `size` bytes aligned to `align` and return the start address.
    pub fn reserve(&mut self, size: u32, align: u32) -> CompileResult<u32> {
        if align == 0 {
            return Err(CompileError::InvalidAlignment { align });
        }
        let overflow = || CompileError::AddressOverflow {
            size: u64::from(size),
        };
        let address = self
            .cursor
            .checked_next_multiple_of(align)
            .ok_or_else(overflow)?;
        self.cursor = address.checked_add(size).ok_or_else(overflow)?;
        tracing::trace!(address, size, align, "reserved constant data");
        Ok(address)
    }

    /// Reserve space for `bytes` and record them as a data block.
    pub fn alloc_block(&mut self, bytes: Vec<u8>, align: u32) -> CompileResult<u32> {
        let size = byte_len(&bytes)?;
        let address = self.reserve(size, align)?;
        self.blocks.push(DataBlock { address, bytes });
        Ok(address)
    }

    /// Intern string content and return the address of its bytes.
    ///
    /// Equal contents share one address. Every distinct content occupies at
    /// least one byte, so the empty string still has an address of its own.
    pub fn intern(&mut self, content: &str) -> CompileResult<u32> {
        if let Some(&address) = self.interned.get(content) {
            return Ok(address);
        }
        let size = byte_len(content.as_bytes())?.max(1);
        let address = self.reserve(size, 1)?;
        self.strings.push(DataBlock {
            address,
            bytes: content.as_bytes().to_vec(),
        });
        self.interned.insert(content.to_string(), address);
        tracing::debug!(address, len = content.len(), "interned string");
        Ok(address)
    }

    /// Address of the `{ length, data }` header describing `content`.
    ///
    /// String literals are always accessed through this header.
    pub fn string_header(&mut self, content: &str) -> CompileResult<u32> {
        if let Some(&address) = self.headers.get(content) {
            return Ok(address);
        }
        let data = self.intern(content)?;
        let length = byte_len(content.as_bytes())?;
        let mut bytes = Vec::with_capacity(STRING_HEADER_SIZE as usize);
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes.extend_from_slice(&data.to_le_bytes());
        let address = self.alloc_block(bytes, 4)?;
        self.headers.insert(content.to_string(), address);
        Ok(address)
    }

    /// Address of already-interned content.
    pub fn interned(&self, content: &str) -> Option<u32> {
        self.interned.get(content).copied()
    }

    pub fn strings(&self) -> &[DataBlock] {
        &self.strings
    }

    pub fn blocks(&self) -> &[DataBlock] {
        &self.blocks
    }

    /// Every data block (strings first, then headers and literals).
    pub fn segments(&self) -> impl Iterator<Item = &DataBlock> + '_ {
        self.strings.iter().chain(self.blocks.iter())
    }
}

fn byte_len(bytes: &[u8]) -> CompileResult<u32> {
    u32::try_from(bytes.len()).map_err(|_| CompileError::AddressOverflow {
        size: bytes.len() as u64,
    })
}
