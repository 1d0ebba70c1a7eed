//! Holding-register storage for the server role.

use std::sync::atomic::{AtomicU16, Ordering};

/// Number of rows the demo table carries.
pub const DEMO_TABLE_ROWS: usize = 11240;

/// Seed pattern repeated across the demo table.
const DEMO_PATTERN: [u16; 10] = [1, 1, 0, 0, 0, 0, 0, 0, 0, 0];

/// Read access to the holding-register table. Reads outside the table
/// return 0 rather than failing; the reply builder relies on that.
pub trait RegisterStore: Send + Sync {
    fn get(&self, address: u16) -> u16;
    fn row_count(&self) -> usize;
}

/// In-memory register table shared across connection handlers.
///
/// Cells are atomics so the table can be updated while handlers read
/// it; register values are independent, so `Relaxed` is enough.
pub struct MemoryRegisterTable {
    cells: Vec<AtomicU16>,
}

impl MemoryRegisterTable {
    pub fn new(rows: usize) -> Self {
        let mut cells = Vec::with_capacity(rows);
        cells.resize_with(rows, || AtomicU16::new(0));
        Self { cells }
    }

    /// Table pre-filled with the repeating demo pattern, sized like the
    /// reference device map.
    pub fn with_demo_pattern(rows: usize) -> Self {
        let table = Self::new(rows);
        for (i, cell) in table.cells.iter().enumerate() {
            cell.store(DEMO_PATTERN[i % DEMO_PATTERN.len()], Ordering::Relaxed);
        }
        table
    }

    /// Write one register; out-of-range addresses are ignored.
    pub fn set(&self, address: u16, value: u16) {
        if let Some(cell) = self.cells.get(address as usize) {
            cell.store(value, Ordering::Relaxed);
        }
    }
}

impl RegisterStore for MemoryRegisterTable {
    fn get(&self, address: u16) -> u16 {
        self.cells
            .get(address as usize)
            .map(|cell| cell.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn row_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reads_zero() {
        let table = MemoryRegisterTable::new(4);
        table.set(3, 7);
        assert_eq!(table.get(3), 7);
        assert_eq!(table.get(4), 0);
        assert_eq!(table.get(u16::MAX), 0);
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let table = MemoryRegisterTable::new(2);
        table.set(5, 99);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(5), 0);
    }

    #[test]
    fn test_demo_pattern_repeats() {
        let table = MemoryRegisterTable::with_demo_pattern(25);
        assert_eq!(table.get(0), 1);
        assert_eq!(table.get(1), 1);
        assert_eq!(table.get(2), 0);
        assert_eq!(table.get(9), 0);
        assert_eq!(table.get(10), 1);
        assert_eq!(table.get(11), 1);
        assert_eq!(table.get(20), 1);
        assert_eq!(table.row_count(), 25);
    }
}
