//! Handle-indexed array heap.
//!
//! A compiled Drac module has no allocator of its own. Every dynamic array
//! it uses lives here, and the module only ever holds the array's handle:
//! its position in the table. The table is append-only, so a handle stays
//! valid for the whole run and is never handed out twice.

use crate::error::HeapError;

/// Module-visible name of one array.
pub type Handle = i32;

/// Append-only table of integer arrays.
#[derive(Debug, Default, Clone)]
pub struct HandleTable {
    /// Arrays indexed by handle.
    arrays: Vec<Vec<i32>>,
}

impl HandleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arrays allocated so far.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Check if nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Append a new array and return its handle.
    pub fn allocate(&mut self, contents: Vec<i32>) -> Handle {
        // Handles stay within the non-negative i32 range: each entry costs a
        // `Vec` header, so memory runs out long before 2^31 arrays exist.
        let handle = self.arrays.len() as Handle;
        log::trace!("[drac heap] allocate handle={} len={}", handle, contents.len());
        self.arrays.push(contents);
        handle
    }

    /// Allocate an array of `n` zeroes.
    pub fn allocate_zeroed(&mut self, n: i32) -> Result<Handle, HeapError> {
        if n < 0 {
            return Err(HeapError::NegativeSize(n));
        }
        Ok(self.allocate(vec![0; n as usize]))
    }

    /// Check that `h` names an allocated array and return its table index.
    pub fn validate_handle(&self, h: Handle) -> Result<usize, HeapError> {
        usize::try_from(h)
            .ok()
            .filter(|&slot| slot < self.arrays.len())
            .ok_or(HeapError::InvalidHandle(h))
    }

    /// Check `h` and then `i` against the array it names.
    /// Returns the table index and element index.
    pub fn validate_index(&self, h: Handle, i: i32) -> Result<(usize, usize), HeapError> {
        let slot = self.validate_handle(h)?;
        let index = usize::try_from(i)
            .ok()
            .filter(|&index| index < self.arrays[slot].len())
            .ok_or(HeapError::IndexOutOfBounds(i))?;
        Ok((slot, index))
    }

    /// Contents of the array named by `h`.
    pub fn array(&self, h: Handle) -> Result<&[i32], HeapError> {
        let slot = self.validate_handle(h)?;
        Ok(&self.arrays[slot])
    }

    /// Number of elements in the array named by `h`.
    pub fn size(&self, h: Handle) -> Result<i32, HeapError> {
        // Element counts are reported with the module's integer width.
        self.array(h).map(|a| a.len() as i32)
    }

    /// Append `x` to the array named by `h`.
    pub fn push(&mut self, h: Handle, x: i32) -> Result<(), HeapError> {
        let slot = self.validate_handle(h)?;
        self.arrays[slot].push(x);
        log::trace!("[drac heap] push handle={} value={}", h, x);
        Ok(())
    }

    /// Read element `i` of the array named by `h`.
    pub fn get(&self, h: Handle, i: i32) -> Result<i32, HeapError> {
        let (slot, index) = self.validate_index(h, i)?;
        Ok(self.arrays[slot][index])
    }

    /// Overwrite element `i` of the array named by `h`.
    pub fn set(&mut self, h: Handle, i: i32, x: i32) -> Result<(), HeapError> {
        let (slot, index) = self.validate_index(h, i)?;
        self.arrays[slot][index] = x;
        log::trace!("[drac heap] set handle={} index={} value={}", h, i, x);
        Ok(())
    }
}
