/*!
Memory module: the 32K-word main memory of the machine and its fixed segment map.

Address map (word addresses):
- Code  : 0..=4095      program words, loaded from address 1 upward
- Stack : 4096..=12287  grows upward from `STACK_BASE` toward `STACK_LIMIT`
- Heap  : 12288..=65535 conceptually grows downward from `HEAP_TOP`

Only the first `MEMORY_WORDS` addresses are backed by storage. The heap is
reachable through the `ma` register with `load` / `store` only; no opcode
allocates from it, so no boundary policing is done for it here.

`Memory` itself performs no segment enforcement. Callers (the executor) are
responsible for staying inside the backed range; `read` / `write` with an
unbacked address is a defect in the caller and panics. The fallible `get`
exists for instruction fetch, which must turn a bad address into a fault.
*/

/// Number of backed 16-bit words (64 KiB of storage).
pub const MEMORY_WORDS: usize = 32 * 1024;

/// First address of the code segment.
pub const CODE_BASE: u16 = 0;
/// Last address of the code segment (inclusive).
pub const CODE_END: u16 = 4095;
/// First address of the stack segment; `sp` starts here.
pub const STACK_BASE: u16 = 4096;
/// One past the last stack address; a push with `sp` at this value overflows.
pub const STACK_LIMIT: u16 = 12 * 1024;
/// Highest heap address. The heap grows downward from here toward `STACK_LIMIT`.
pub const HEAP_TOP: u16 = 65535;

/// The three fixed, disjoint segments of the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Code,
    Stack,
    Heap,
}

impl Segment {
    /// Classify a word address.
    #[inline]
    pub fn of(addr: u16) -> Self {
        match addr {
            CODE_BASE..=CODE_END => Segment::Code,
            STACK_BASE..STACK_LIMIT => Segment::Stack,
            _ => Segment::Heap,
        }
    }
}

/// Word-addressable main memory, zero initialized.
#[derive(Clone)]
pub struct Memory {
    data: Box<[i16]>,
}

impl Default for Memory {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&w| w != 0).count();
        f.debug_struct("Memory")
            .field("words", &self.data.len())
            .field("non_zero", &used)
            .finish()
    }
}

impl Memory {
    /// Create a new memory instance with every word set to 0.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: vec![0; MEMORY_WORDS].into_boxed_slice(),
        }
    }

    /// Clear all words to 0.
    #[inline]
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// True if `addr` is backed by storage.
    #[inline]
    pub fn contains(addr: u16) -> bool {
        (addr as usize) < MEMORY_WORDS
    }

    /// Read the word at `addr`.
    ///
    /// Panics if `addr` is not backed; see `get` for the checked variant.
    #[inline]
    pub fn read(&self, addr: u16) -> i16 {
        self.data[addr as usize]
    }

    /// Write `value` at `addr`.
    ///
    /// Panics if `addr` is not backed; see `set` for the checked variant.
    #[inline]
    pub fn write(&mut self, addr: u16, value: i16) {
        self.data[addr as usize] = value;
    }

    /// Checked read. Returns `None` for an unbacked address.
    #[inline]
    pub fn get(&self, addr: u16) -> Option<i16> {
        self.data.get(addr as usize).copied()
    }

    /// Expose the backing words (read-only). Useful for diagnostics and tests.
    #[inline]
    pub fn as_slice(&self) -> &[i16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_init() {
        let m = Memory::new();
        assert_eq!(m.as_slice().len(), MEMORY_WORDS);
        assert!(m.as_slice().iter().all(|&w| w == 0));
    }

    #[test]
    fn read_write_signed_words() {
        let mut m = Memory::new();
        m.write(1, -1);
        m.write(STACK_BASE, i16::MIN);
        assert_eq!(m.read(1), -1);
        assert_eq!(m.read(STACK_BASE), i16::MIN);

        m.reset();
        assert_eq!(m.read(1), 0);
    }

    #[test]
    fn checked_access_past_backing() {
        let mut m = Memory::new();
        let last = (MEMORY_WORDS - 1) as u16;
        assert!(Memory::contains(last));
        assert!(!Memory::contains(last + 1));

        m.write(last, 7);
        assert_eq!(m.get(last), Some(7));
        assert_eq!(m.get(last + 1), None);
        assert_eq!(m.get(HEAP_TOP), None);
    }

    #[test]
    fn segment_boundaries() {
        assert_eq!(Segment::of(0), Segment::Code);
        assert_eq!(Segment::of(CODE_END), Segment::Code);
        assert_eq!(Segment::of(STACK_BASE), Segment::Stack);
        assert_eq!(Segment::of(STACK_LIMIT - 1), Segment::Stack);
        assert_eq!(Segment::of(STACK_LIMIT), Segment::Heap);
        assert_eq!(Segment::of(HEAP_TOP), Segment::Heap);
    }
}
