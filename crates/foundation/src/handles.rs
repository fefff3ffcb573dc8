/// Generational handle: `(slot index, generation)`.
///
/// A handle stays valid until its slot is freed; the slot's next occupant gets
/// a bumped generation, so stale handles never alias a newer value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}
