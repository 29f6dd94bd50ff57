use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::constants::{MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::errors::{Fault, LoadError};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operations;
use crate::program::ProgramInfo;
use crate::quirks::Quirks;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the random source used by `RND`, seeded once when the machine is built
///  - the loaded program's metadata
///  - the fault that halted execution, if any
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU and its timers
/// - inspecting its frame buffer for rendering by some display
///
/// Nothing here paces itself: a driver calls `cycle` as often as it likes and
/// `cycle_timers` at 60Hz.
pub struct Chip8<R = StdRng> {
    state: State,
    rng: R,
    quirks: Quirks,
    program: Option<ProgramInfo>,
    fault: Option<Fault>,
}

/// Configures a `Chip8` before it is built.
#[derive(Debug, Default, Clone)]
pub struct Chip8Builder {
    quirks: Quirks,
    seed: Option<u64>,
}

impl Chip8Builder {
    pub fn quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    /// Fixes the seed of the random source so `RND` is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Chip8 {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(rng)
    }

    /// Builds a machine around a caller supplied random source. The seed, if any, is ignored.
    pub fn build_with_rng<R: RngCore>(self, rng: R) -> Chip8<R> {
        Chip8 {
            state: State::new(),
            rng,
            quirks: self.quirks,
            program: None,
            fault: None,
        }
    }
}

impl Chip8 {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> Chip8Builder {
        Chip8Builder::default()
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Chip8<R> {
    /// Copies a program into memory at `PROGRAM_START` and resets the CPU.
    ///
    /// Whatever a previous program left above `PROGRAM_START` is zeroed first.
    /// If the program doesn't fit, memory is left untouched.
    pub fn load(&mut self, bytes: &[u8]) -> Result<ProgramInfo, LoadError> {
        self.install(bytes, ProgramInfo::new("rom", bytes.len()))
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a reader that yields a ROM
    /// * `name` the name to record for the program
    pub fn load_rom(
        &mut self,
        reader: &mut dyn Read,
        name: &str,
    ) -> Result<ProgramInfo, LoadError> {
        // One byte more than fits is enough to tell a ROM is too large
        let mut bytes = Vec::with_capacity(MAX_PROGRAM_SIZE);
        reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut bytes)?;
        self.install(&bytes, ProgramInfo::new(name, bytes.len()))
    }

    /// Load a rom from a file on disk, naming the program after the file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<ProgramInfo, LoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.install(&bytes, ProgramInfo::from_path(path, bytes.len()))
    }

    fn install(&mut self, bytes: &[u8], info: ProgramInfo) -> Result<ProgramInfo, LoadError> {
        if bytes.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: bytes.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        let program_area = &mut self.state.memory[start..];
        program_area.fill(0);
        program_area[..bytes.len()].copy_from_slice(bytes);

        debug!("loaded {} ({} bytes)", info.name, info.size);
        self.program = Some(info.clone());
        self.reset();
        Ok(info)
    }

    /// Returns the CPU to its power-on state and clears any fault.
    /// The loaded program, sprite sheet and key states are kept.
    pub fn reset(&mut self) {
        self.state.reset();
        self.fault = None;
        debug!("reset");
    }

    /// Advances the CPU by a single cycle
    /// - gets the opcode pointed at by the pc and moves the pc past it
    /// - decodes and executes it
    ///
    /// A fault restores the pc to the faulting instruction and halts the machine: every later
    /// call returns the same fault until `reset` or a new `load`.
    pub fn cycle(&mut self) -> Result<(), Fault> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let pc = self.state.pc;
        let result = self.step(pc);
        if let Err(fault) = result {
            warn!("halted: {}", fault);
            self.state.pc = pc;
            self.fault = Some(fault);
        }
        result
    }

    fn step(&mut self, pc: u16) -> Result<(), Fault> {
        let op = self.get_op(pc)?;
        let instruction = Instruction::decode(op);
        trace!(
            "{:03X}: {} {} v{:02X?} i{:03X}",
            pc,
            op,
            instruction,
            self.state.v,
            self.state.i
        );
        self.state.pc = pc + 2;
        operations::execute(instruction, &mut self.state, &mut self.rng, self.quirks, pc)
    }

    /// Gets the opcode at `pc`.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    fn get_op(&self, pc: u16) -> Result<Opcode, Fault> {
        let bytes = self.state.memory_range(pc as usize, 2, pc)?;
        let word = &self.state.memory[bytes];
        Ok(Opcode::from_bytes(word[0], word[1]))
    }

    /// Decrements the delay and sound timers if they're above 0.
    /// Should be called at 60Hz, independently of how many instructions run in that time.
    pub fn cycle_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Runs one 60Hz frame: `instructions` cycles followed by one timer tick.
    /// Stops at the first fault, in which case the timers are not ticked.
    pub fn step_frame(&mut self, instructions: u32) -> Result<(), Fault> {
        for _ in 0..instructions {
            self.cycle()?;
        }
        self.cycle_timers();
        Ok(())
    }

    /// Set the pressed status of a key
    ///
    /// # Arguments
    /// * `key` the key's hex value, 0x0..=0xF
    /// * `pressed` whether it is being held down
    pub fn set_key_state(&mut self, key: u8, pressed: bool) -> Result<(), Fault> {
        let slot = self
            .state
            .pressed_keys
            .get_mut(key as usize)
            .ok_or(Fault::KeyOutOfRange { key })?;
        *slot = pressed;
        Ok(())
    }

    pub fn key_press(&mut self, key: u8) -> Result<(), Fault> {
        self.set_key_state(key, true)
    }

    pub fn key_release(&mut self, key: u8) -> Result<(), Fault> {
        self.set_key_state(key, false)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Whether the FrameBuffer changed since it was last taken
    pub fn should_draw(&self) -> bool {
        self.state.draw_flag
    }

    /// Returns the FrameBuffer if the display should be redrawn, and unsets the draw flag
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    /// The buzzer sounds for as long as the sound timer is running
    pub fn buzzer_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Read-only view of registers, memory, stack and keys, for debugging.
    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn program(&self) -> Option<&ProgramInfo> {
        self.program.as_ref()
    }

    /// The fault that halted the machine, if it is halted
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_SHEET};
    use std::io::Cursor;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::builder().seed(1).build();
        chip8.load(program).unwrap();
        chip8
    }

    #[test]
    fn test_chip8_gets_op() {
        let chip8 = chip8_with(&[0xAA, 0xBB]);
        assert_eq!(chip8.get_op(0x200), Ok(Opcode(0xAABB)));
    }

    #[test]
    fn test_new_chip8_has_sprite_sheet() {
        let chip8 = Chip8::new();
        for k in 0..16 {
            assert_eq!(
                chip8.state().memory[5 * k..5 * k + 5],
                SPRITE_SHEET[5 * k..5 * k + 5]
            );
        }
    }

    #[test]
    fn test_load_places_program_at_start() {
        let program: Vec<u8> = (0..=255).collect();
        let chip8 = chip8_with(&program);
        for (offset, byte) in program.iter().enumerate() {
            assert_eq!(chip8.state().memory[0x200 + offset], *byte);
        }
        assert_eq!(chip8.program().map(|p| p.size), Some(256));
    }

    #[test]
    fn test_load_clears_previous_program() {
        let mut chip8 = chip8_with(&[0x11; 64]);
        chip8.load(&[0x22; 2]).unwrap();
        assert_eq!(chip8.state().memory[0x200..0x202], [0x22, 0x22]);
        assert!(chip8.state().memory[0x202..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_largest_program() {
        let mut chip8 = Chip8::new();
        let info = chip8.load(&[0xAB; MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(info.size, 3584);
        assert_eq!(chip8.state().memory[0xFFF], 0xAB);
    }

    #[test]
    fn test_load_too_large_leaves_memory_alone() {
        let mut chip8 = chip8_with(&[0x12, 0x34]);
        let before = chip8.state().memory;
        let err = chip8.load(&[0xFF; MAX_PROGRAM_SIZE + 1]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ProgramTooLarge {
                size: 3585,
                max: 3584
            }
        ));
        assert!(chip8.state().memory[..] == before[..]);
        assert_eq!(chip8.program().map(|p| p.size), Some(2));
    }

    #[test]
    fn test_load_rom_from_reader() {
        let mut chip8 = Chip8::new();
        let info = chip8
            .load_rom(&mut Cursor::new(vec![0x00, 0xE0]), "cls")
            .unwrap();
        assert_eq!(info, ProgramInfo::new("cls", 2));
        assert_eq!(chip8.state().memory[0x200..0x202], [0x00, 0xE0]);
    }

    #[test]
    fn test_load_rom_rejects_oversized_stream() {
        let mut chip8 = Chip8::new();
        let err = chip8
            .load_rom(&mut Cursor::new(vec![0x1; 5000]), "big")
            .unwrap_err();
        assert!(matches!(err, LoadError::ProgramTooLarge { .. }));
    }

    #[test]
    fn test_load_file_missing() {
        let mut chip8 = Chip8::new();
        let err = chip8.load_file("does/not/exist.ch8").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(chip8.program().is_none());
    }

    #[test]
    fn test_load_file_records_program() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pong.ch8");
        fs::write(&path, [0x00u8, 0xE0, 0x12, 0x00]).unwrap();

        let mut chip8 = Chip8::new();
        let info = chip8.load_file(&path).unwrap();
        assert_eq!(info.size, 4);
        assert_eq!(chip8.program(), Some(&info));

        let program = chip8.program().unwrap();
        assert_eq!(program.name, "pong");
        assert_eq!(program.path.as_deref(), Some(path.as_path()));
        assert_eq!(chip8.state().memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_builder_applies_quirks() {
        let quirks = Quirks {
            shift_uses_vy: true,
            ..Quirks::default()
        };
        assert_eq!(Chip8::builder().quirks(quirks).build().quirks(), quirks);
        assert_eq!(Chip8::new().quirks(), Quirks::default());
    }

    #[test]
    fn test_cycle_advances_pc() {
        // cls
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        chip8.cycle().unwrap();
        assert_eq!(chip8.state().pc, 0x202);
    }

    #[test]
    fn test_cycle_clears_screen() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        chip8.state.frame_buffer = [[1; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        chip8.cycle().unwrap();
        assert!(chip8.frame_buffer().iter().flatten().all(|&px| px == 0));
    }

    #[test]
    fn test_fault_halts_until_reset() {
        // ld v1, 0x05; unknown
        let mut chip8 = chip8_with(&[0x61, 0x05, 0xF1, 0xFF]);
        chip8.cycle().unwrap();
        let fault = Fault::UnknownInstruction {
            opcode: Opcode(0xF1FF),
            pc: 0x202,
        };
        assert_eq!(chip8.cycle(), Err(fault));
        assert_eq!(chip8.state().pc, 0x202);
        assert_eq!(chip8.fault(), Some(fault));
        assert_eq!(chip8.cycle(), Err(fault));
        assert_eq!(chip8.state().v[0x1], 0x05);

        chip8.reset();
        assert_eq!(chip8.fault(), None);
        assert_eq!(chip8.state().v[0x1], 0x0);
        assert_eq!(chip8.cycle(), Ok(()));
    }

    #[test]
    fn test_fetch_past_memory_faults() {
        // jp 0xFFF
        let mut chip8 = chip8_with(&[0x1F, 0xFF]);
        chip8.cycle().unwrap();
        assert_eq!(
            chip8.cycle(),
            Err(Fault::MemoryOutOfBounds {
                address: 0x1000,
                pc: 0xFFF
            })
        );
    }

    #[test]
    fn test_wait_for_key_busy_polls() {
        // ld v3, k
        let mut chip8 = chip8_with(&[0xF3, 0x0A]);
        for _ in 0..5 {
            chip8.cycle().unwrap();
            assert_eq!(chip8.state().pc, 0x200);
        }
        chip8.key_press(0x4).unwrap();
        chip8.cycle().unwrap();
        assert_eq!(chip8.state().pc, 0x202);
        assert_eq!(chip8.state().v[0x3], 0x4);
    }

    #[test]
    fn test_key_state() {
        let mut chip8 = Chip8::new();
        chip8.set_key_state(0xF, true).unwrap();
        assert!(chip8.state().pressed_keys[0xF]);
        chip8.key_release(0xF).unwrap();
        assert!(!chip8.state().pressed_keys[0xF]);
        assert_eq!(
            chip8.set_key_state(0x10, true),
            Err(Fault::KeyOutOfRange { key: 0x10 })
        );
    }

    #[test]
    fn test_timers_never_underflow() {
        let mut chip8 = Chip8::new();
        chip8.cycle_timers();
        assert_eq!(chip8.state().delay_timer, 0);
        assert_eq!(chip8.state().sound_timer, 0);

        chip8.state.delay_timer = 3;
        chip8.state.sound_timer = 1;
        assert!(chip8.buzzer_active());
        chip8.cycle_timers();
        assert_eq!(chip8.state().delay_timer, 2);
        assert_eq!(chip8.state().sound_timer, 0);
        assert!(!chip8.buzzer_active());
    }

    #[test]
    fn test_step_frame_ticks_timers_once() {
        // ld v0, 0x3c; ld dt, v0; jp 0x204
        let mut chip8 = chip8_with(&[0x60, 0x3C, 0xF0, 0x15, 0x12, 0x04]);
        chip8.step_frame(10).unwrap();
        assert_eq!(chip8.state().delay_timer, 0x3B);
        assert_eq!(chip8.state().pc, 0x204);
    }

    #[test]
    fn test_take_frame_unsets_draw_flag() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        // reset after load already asks for a redraw
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
        chip8.cycle().unwrap();
        assert!(chip8.should_draw());
        assert!(chip8.take_frame().is_some());
        assert!(!chip8.should_draw());
    }

    #[test]
    fn test_seeded_machines_agree() {
        // rnd v0, 0xff; jp 0x200
        let program = [0xC0, 0xFF, 0x12, 0x00];
        let mut a = chip8_with(&program);
        let mut b = chip8_with(&program);
        for _ in 0..20 {
            a.cycle().unwrap();
            b.cycle().unwrap();
            assert_eq!(a.state().v[0x0], b.state().v[0x0]);
        }
    }
}
