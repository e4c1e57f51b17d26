/// Width of every value, and therefore of every stack slot.
pub const SLOT_SIZE: u32 = 8;

/// Bytes reserved for variables in the entry point's stack frame.
pub const FRAME_SIZE: u32 = 256;

/// A variable bound to a stack slot, addressed as `[rbp - offset]`.
#[derive(Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: Box<str>,
    pub offset: u32,
}

/// Flat, append-only mapping of variable names to stack slots.
///
/// Declaring a name twice allocates a second slot; lookups resolve to the most
/// recent declaration.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    current_offset: u32,
}

/// The frame has no room for another slot.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameExhausted;

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    /// Allocates the next slot for `name`, returning its offset.
    pub fn allocate(&mut self, name: &str) -> Result<u32, FrameExhausted> {
        let offset = self.current_offset + SLOT_SIZE;
        if offset > FRAME_SIZE {
            return Err(FrameExhausted);
        }
        self.current_offset = offset;
        self.symbols.push(Symbol {
            name: name.into(),
            offset,
        });
        log::debug!("allocated [rbp - {offset}] for {name}");
        Ok(offset)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().rev().find(|s| &*s.name == name)
    }

    /// All entries, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub const fn capacity() -> u32 {
        FRAME_SIZE / SLOT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slots_are_allocated_in_order() {
        let mut table = SymbolTable::new();
        assert_eq!(table.allocate("a"), Ok(8));
        assert_eq!(table.allocate("b"), Ok(16));
        assert_eq!(table.allocate("c"), Ok(24));
        let names: Vec<_> = table.symbols().iter().map(|s| &*s.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_lookup_missing() {
        let mut table = SymbolTable::new();
        table.allocate("a").unwrap();
        assert_eq!(table.lookup("b"), None);
        assert_eq!(table.lookup("A"), None);
    }

    #[test]
    fn test_redeclaration_shadows_previous_slot() {
        let mut table = SymbolTable::new();
        table.allocate("x").unwrap();
        table.allocate("y").unwrap();
        table.allocate("x").unwrap();
        assert_eq!(table.symbols().len(), 3);
        assert_eq!(table.lookup("x").map(|s| s.offset), Some(24));
        assert_eq!(table.lookup("y").map(|s| s.offset), Some(16));
    }

    #[test]
    fn test_frame_capacity() {
        let mut table = SymbolTable::new();
        for i in 0..SymbolTable::capacity() {
            assert_eq!(table.allocate(&format!("v{i}")), Ok((i + 1) * SLOT_SIZE));
        }
        assert_eq!(table.allocate("overflow"), Err(FrameExhausted));
        assert_eq!(table.lookup("overflow"), None);
        assert_eq!(table.symbols().len(), 32);
    }
}
