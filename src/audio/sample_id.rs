// handle the sequencer holds for a decoded buffer living inside the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

// hands out ids in load order; one per session, owned by the session
#[derive(Debug, Default)]
pub struct SampleIds {
    next: u64,
}

impl SampleIds {
    pub fn allocate(&mut self) -> SampleId {
        let id = SampleId(self.next);
        self.next += 1;
        id
    }
}
