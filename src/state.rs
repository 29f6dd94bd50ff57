use std::fmt::Write;
use std::ops::Range;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    REGISTER_COUNT, SPRITE_SHEET, STACK_DEPTH,
};
use crate::errors::Fault;

/// The FrameBuffer is indexed as [y][x]; every pixel is 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound)
/// - the buzzer sounds while the sound timer is above 0
///
/// ## Memory
/// - 16 slot stack
///     - stores return addresses when subroutines are called
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 holds the sprite sheet
///     - programs are loaded from 0x200
/// - 32x64 byte frame buffer
///     - stores the contents of the next frame to be drawn
///
/// ## Input
/// - the pressed status of keys 0..F
#[derive(Clone)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub pressed_keys: [bool; KEY_COUNT],
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            pressed_keys: [false; KEY_COUNT],
        }
    }

    /// Returns the CPU to its power-on state.
    /// Memory (and with it the loaded program and sprite sheet) and the keypad are left alone.
    pub fn reset(&mut self) {
        self.v = [0; REGISTER_COUNT];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack = [0; STACK_DEPTH];
        self.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        // the cleared screen still needs to reach the display
        self.draw_flag = true;
    }

    /// Register `x`, by its 4-bit index.
    pub(crate) fn vx(&self, x: u8) -> u8 {
        self.v[x as usize]
    }

    pub(crate) fn set_vx(&mut self, x: u8, value: u8) {
        self.v[x as usize] = value;
    }

    pub(crate) fn set_flag(&mut self, set: bool) {
        self.v[FLAG_REGISTER] = u8::from(set);
    }

    /// Skips the next instruction when `condition` holds.
    /// The pc has already been moved past the current instruction.
    pub(crate) fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    /// Checks that `len` bytes starting at `start` lie in memory.
    ///
    /// # Arguments
    /// * `pc` the instruction asking, reported if the range is out of bounds
    pub(crate) fn memory_range(
        &self,
        start: usize,
        len: usize,
        pc: u16,
    ) -> Result<Range<usize>, Fault> {
        let end = start + len;
        if len == 0 {
            let start = start.min(MEMORY_SIZE);
            Ok(start..start)
        } else if end > MEMORY_SIZE {
            Err(Fault::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE),
                pc,
            })
        } else {
            Ok(start..end)
        }
    }

    /// Pushes a return address.
    pub(crate) fn push(&mut self, address: u16, pc: u16) -> Result<(), Fault> {
        let slot = self
            .stack
            .get_mut(self.sp)
            .ok_or(Fault::StackOverflow { pc })?;
        *slot = address;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recent return address.
    pub(crate) fn pop(&mut self, pc: u16) -> Result<u16, Fault> {
        let top = self.sp.checked_sub(1).ok_or(Fault::StackUnderflow { pc })?;
        self.sp = top;
        Ok(self.stack[top])
    }

    /// The key whose status is being asked for, if it exists on the keypad.
    pub(crate) fn key_pressed(&self, key: u8) -> Result<bool, Fault> {
        self.pressed_keys
            .get(key as usize)
            .copied()
            .ok_or(Fault::KeyOutOfRange { key })
    }

    /// Lowest numbered key currently held down.
    pub(crate) fn first_pressed_key(&self) -> Option<u8> {
        self.pressed_keys
            .iter()
            .position(|&pressed| pressed)
            .map(|key| key as u8)
    }

    /// Multi-line listing of every register, for debugging.
    pub fn register_dump(&self) -> String {
        let mut dump = String::new();
        for (index, value) in self.v.iter().enumerate() {
            let _ = writeln!(dump, "  V{:X}: {:#04X} ({})", index, value, value);
        }
        let _ = writeln!(dump, "   I: {:#06X}", self.i);
        let _ = writeln!(dump, "  PC: {:#06X}", self.pc);
        let _ = writeln!(dump, "  SP: {}", self.sp);
        let _ = writeln!(dump, "  DT: {}", self.delay_timer);
        let _ = writeln!(dump, "  ST: {}", self.sound_timer);
        let _ = write!(dump, "  stack: {:03X?}", &self.stack[..self.sp]);
        dump
    }

    /// Hex listing of `len` bytes of memory from `offset`, one 16-bit word per line.
    /// The range is clamped to the end of memory.
    pub fn memory_dump(&self, offset: usize, len: usize) -> String {
        let start = offset.min(MEMORY_SIZE);
        let end = offset.saturating_add(len).min(MEMORY_SIZE);
        let mut dump = String::new();
        for (index, word) in self.memory[start..end].chunks(2).enumerate() {
            let _ = write!(dump, "{:#06X}:", start + index * 2);
            for byte in word {
                let _ = write!(dump, " {:02X}", byte);
            }
            dump.push('\n');
        }
        dump
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
