/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 4096;

/// ROMs are loaded into memory, and start executing, at this address.
/// Everything below it belongs to the interpreter (the sprite sheet lives at 0x000).
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Return addresses the call stack can hold.
pub const STACK_DEPTH: usize = 16;

/// V0..VF
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry, borrow and collision flag.
pub const FLAG_REGISTER: usize = 0xF;

/// Keys 0..F on the hex keypad.
pub const KEY_COUNT: usize = 16;

/// Every glyph in the sprite sheet is 8x5 pixels, one byte per row.
pub const SPRITE_HEIGHT: u16 = 5;

/// The delay and sound timers count down at 60Hz regardless of instruction throughput.
pub const TIMER_FREQUENCY: u32 = 60;

/// Instructions executed between two timer ticks unless a driver asks for something else.
/// 10 per frame is ~600 instructions per second.
pub const DEFAULT_INSTRUCTIONS_PER_FRAME: u32 = 10;

/// # Sprite Sheet
/// Hex digits 0..F drawn as 8x5 sprites; only the high nibble of each row is used.
///
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
/// Glyph `k` occupies `[k * 5, k * 5 + 5)`, which `LD F, Vx` depends on.
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
