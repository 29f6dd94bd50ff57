/// Compatibility switches for behavior that differs between Chip-8 interpreters.
///
/// The defaults describe the documented instruction set; each flag opts into the
/// behavior of some other interpreter lineage.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `LD [I], Vx` and `LD Vx, [I]` leave I untouched instead of advancing it by x + 1.
    pub load_store_leaves_i: bool,
    /// `SHR`/`SHL` shift Vy into Vx instead of shifting Vx in place.
    pub shift_uses_vy: bool,
}
