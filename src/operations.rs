use rand::{Rng, RngCore};

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_HEIGHT};
use crate::errors::Fault;
use crate::instruction::Instruction;
use crate::quirks::Quirks;
use crate::state::State;

/// Applies a decoded instruction to the state.
///
/// The pc has already been advanced past the instruction; `pc` is the instruction's own address
/// and is what any fault reports. Every operation checks its operands before touching state so
/// a fault leaves `state` as it found it.
pub fn execute<R: RngCore>(
    instruction: Instruction,
    state: &mut State,
    rng: &mut R,
    quirks: Quirks,
    pc: u16,
) -> Result<(), Fault> {
    use Instruction::*;

    match instruction {
        Cls => clr(state),
        Ret => rts(state, pc)?,
        Jp { addr } => jump(state, addr),
        Call { addr } => call(state, addr, pc)?,
        SeByte { x, nn } => ske(state, x, nn),
        SneByte { x, nn } => skne(state, x, nn),
        SeReg { x, y } => skre(state, x, y),
        LdByte { x, nn } => load(state, x, nn),
        AddByte { x, nn } => add(state, x, nn),
        LdReg { x, y } => mv(state, x, y),
        Or { x, y } => or(state, x, y),
        And { x, y } => and(state, x, y),
        Xor { x, y } => xor(state, x, y),
        AddReg { x, y } => addr(state, x, y),
        Sub { x, y } => sub(state, x, y),
        Shr { x, y } => shr(state, x, y, quirks),
        Subn { x, y } => subn(state, x, y),
        Shl { x, y } => shl(state, x, y, quirks),
        SneReg { x, y } => skrne(state, x, y),
        LdI { addr } => loadi(state, addr),
        JpV0 { addr } => jumpi(state, addr),
        Rnd { x, nn } => rnd(state, x, nn, rng),
        Drw { x, y, n } => draw(state, x, y, n, pc)?,
        Skp { x } => skpr(state, x)?,
        Sknp { x } => skup(state, x)?,
        LdVxDt { x } => moved(state, x),
        LdVxK { x } => keyd(state, x),
        LdDtVx { x } => loads(state, x),
        LdStVx { x } => ld(state, x),
        AddIVx { x } => addi(state, x),
        LdFVx { x } => ldspr(state, x),
        LdBVx { x } => bcd(state, x, pc)?,
        LdIVx { x } => stor(state, x, quirks, pc)?,
        LdVxI { x } => read(state, x, quirks, pc)?,
        Unknown(opcode) => return Err(Fault::UnknownInstruction { opcode, pc }),
    }
    Ok(())
}

/// clear
fn clr(state: &mut State) {
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag = true;
}

/// PC = STACK.pop()
fn rts(state: &mut State, pc: u16) -> Result<(), Fault> {
    state.pc = state.pop(pc)?;
    Ok(())
}

/// PC = addr
fn jump(state: &mut State, addr: u16) {
    state.pc = addr;
}

/// STACK.push(PC); PC = addr
fn call(state: &mut State, addr: u16, pc: u16) -> Result<(), Fault> {
    state.push(state.pc, pc)?;
    state.pc = addr;
    Ok(())
}

/// if Vx == nn then pc += 2
fn ske(state: &mut State, x: u8, nn: u8) {
    state.skip_if(state.vx(x) == nn);
}

/// if Vx != nn then pc += 2
fn skne(state: &mut State, x: u8, nn: u8) {
    state.skip_if(state.vx(x) != nn);
}

/// if Vx == Vy then pc += 2
fn skre(state: &mut State, x: u8, y: u8) {
    state.skip_if(state.vx(x) == state.vx(y));
}

/// Vx = nn
fn load(state: &mut State, x: u8, nn: u8) {
    state.set_vx(x, nn);
}

/// Vx += nn
/// Overflow wraps and doesn't touch VF
fn add(state: &mut State, x: u8, nn: u8) {
    state.set_vx(x, state.vx(x).wrapping_add(nn));
}

/// Vx = Vy
fn mv(state: &mut State, x: u8, y: u8) {
    state.set_vx(x, state.vx(y));
}

/// Vx |= Vy
fn or(state: &mut State, x: u8, y: u8) {
    state.set_vx(x, state.vx(x) | state.vx(y));
}

/// Vx &= Vy
fn and(state: &mut State, x: u8, y: u8) {
    state.set_vx(x, state.vx(x) & state.vx(y));
}

/// Vx ^= Vy
fn xor(state: &mut State, x: u8, y: u8) {
    state.set_vx(x, state.vx(x) ^ state.vx(y));
}

// The flag is written after the result in all of the following so that VF ends up holding the
// flag when it is also the destination.

/// Vx += Vy; VF = overflow
fn addr(state: &mut State, x: u8, y: u8) {
    let (res, over) = state.vx(x).overflowing_add(state.vx(y));
    state.set_vx(x, res);
    state.set_flag(over);
}

/// Vx -= Vy; VF = !underflow
fn sub(state: &mut State, x: u8, y: u8) {
    let (res, under) = state.vx(x).overflowing_sub(state.vx(y));
    state.set_vx(x, res);
    state.set_flag(!under);
}

/// Vx = Vy - Vx; VF = !underflow
fn subn(state: &mut State, x: u8, y: u8) {
    let (res, under) = state.vx(y).overflowing_sub(state.vx(x));
    state.set_vx(x, res);
    state.set_flag(!under);
}

fn shift_source(state: &State, x: u8, y: u8, quirks: Quirks) -> u8 {
    if quirks.shift_uses_vy {
        state.vx(y)
    } else {
        state.vx(x)
    }
}

/// Vx >>= 1; VF = shifted out bit
fn shr(state: &mut State, x: u8, y: u8, quirks: Quirks) {
    let source = shift_source(state, x, y, quirks);
    state.set_vx(x, source >> 1);
    state.set_flag(source & 0x01 != 0);
}

/// Vx <<= 1; VF = shifted out bit
fn shl(state: &mut State, x: u8, y: u8, quirks: Quirks) {
    let source = shift_source(state, x, y, quirks);
    state.set_vx(x, source << 1);
    state.set_flag(source & 0x80 != 0);
}

/// if Vx != Vy then pc += 2
fn skrne(state: &mut State, x: u8, y: u8) {
    state.skip_if(state.vx(x) != state.vx(y));
}

/// I = addr
fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
}

/// PC = V0 + addr
/// A target past the end of memory is caught by the next fetch
fn jumpi(state: &mut State, addr: u16) {
    state.pc = u16::from(state.vx(0x0)) + addr;
}

/// Vx = rand_byte & nn
fn rnd<R: RngCore>(state: &mut State, x: u8, nn: u8, rng: &mut R) {
    let rand_byte: u8 = rng.gen();
    state.set_vx(x, rand_byte & nn);
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory I..I+n at position Vx, Vy on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
fn draw(state: &mut State, x: u8, y: u8, n: u8, pc: u16) -> Result<(), Fault> {
    let sprite = state.memory_range(state.i as usize, n as usize, pc)?;
    let origin_x = state.vx(x) as usize;
    let origin_y = state.vx(y) as usize;
    let mut collision = false;

    for (row, byte_index) in sprite.enumerate() {
        let sprite_row = state.memory[byte_index];
        let y = (origin_y + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            if sprite_row & (0x80 >> bit) == 0 {
                continue;
            }
            let x = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = &mut state.frame_buffer[y][x];
            collision |= *pixel == 1;
            *pixel ^= 1;
        }
    }

    state.set_flag(collision);
    state.draw_flag = true;
    Ok(())
}

/// if Vx.pressed then pc += 2
fn skpr(state: &mut State, x: u8) -> Result<(), Fault> {
    let pressed = state.key_pressed(state.vx(x))?;
    state.skip_if(pressed);
    Ok(())
}

/// if !Vx.pressed then pc += 2
fn skup(state: &mut State, x: u8) -> Result<(), Fault> {
    let pressed = state.key_pressed(state.vx(x))?;
    state.skip_if(!pressed);
    Ok(())
}

/// Vx = DT
fn moved(state: &mut State, x: u8) {
    state.set_vx(x, state.delay_timer);
}

/// await keypress for Vx
/// Until some key is held the pc is wound back so this instruction runs again next cycle
fn keyd(state: &mut State, x: u8) {
    match state.first_pressed_key() {
        Some(key) => state.set_vx(x, key),
        None => state.pc = state.pc.wrapping_sub(2),
    }
}

/// DT = Vx
fn loads(state: &mut State, x: u8) {
    state.delay_timer = state.vx(x);
}

/// ST = Vx
fn ld(state: &mut State, x: u8) {
    state.sound_timer = state.vx(x);
}

/// I += Vx
fn addi(state: &mut State, x: u8) {
    state.i = state.i.wrapping_add(u16::from(state.vx(x)));
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for the low nibble of Vx
/// See constants::SPRITE_SHEET for more details
fn ldspr(state: &mut State, x: u8) {
    state.i = u16::from(state.vx(x) & 0xF) * SPRITE_HEIGHT;
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address I
fn bcd(state: &mut State, x: u8, pc: u16) -> Result<(), Fault> {
    let target = state.memory_range(state.i as usize, 3, pc)?;
    let vx = state.vx(x);
    state.memory[target].copy_from_slice(&[vx / 100, vx / 10 % 10, vx % 10]);
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
fn stor(state: &mut State, x: u8, quirks: Quirks, pc: u16) -> Result<(), Fault> {
    let count = x as usize + 1;
    let target = state.memory_range(state.i as usize, count, pc)?;
    state.memory[target].copy_from_slice(&state.v[..count]);
    if !quirks.load_store_leaves_i {
        state.i = state.i.wrapping_add(count as u16);
    }
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
fn read(state: &mut State, x: u8, quirks: Quirks, pc: u16) -> Result<(), Fault> {
    let count = x as usize + 1;
    let source = state.memory_range(state.i as usize, count, pc)?;
    state.v[..count].copy_from_slice(&state.memory[source]);
    if !quirks.load_store_leaves_i {
        state.i = state.i.wrapping_add(count as u16);
    }
    Ok(())
}
