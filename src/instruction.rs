use std::fmt;

use crate::opcode::Opcode;

/// A decoded Chip-8 instruction.
///
/// `x` and `y` name registers, `nn` is an immediate byte, `addr` a 12-bit address and `n` a
/// sprite height. Variant names follow the conventional mnemonics, suffixed with the operand
/// kind where a mnemonic is shared (e.g. `SE Vx, nn` vs `SE Vx, Vy`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xnn
    SeByte { x: u8, nn: u8 },
    /// 4xnn
    SneByte { x: u8, nn: u8 },
    /// 5xy0
    SeReg { x: u8, y: u8 },
    /// 6xnn
    LdByte { x: u8, nn: u8 },
    /// 7xnn
    AddByte { x: u8, nn: u8 },
    /// 8xy0
    LdReg { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddReg { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    Shr { x: u8, y: u8 },
    /// 8xy7
    Subn { x: u8, y: u8 },
    /// 8xyE
    Shl { x: u8, y: u8 },
    /// 9xy0
    SneReg { x: u8, y: u8 },
    /// Annn
    LdI { addr: u16 },
    /// Bnnn
    JpV0 { addr: u16 },
    /// Cxnn
    Rnd { x: u8, nn: u8 },
    /// Dxyn
    Drw { x: u8, y: u8, n: u8 },
    /// Ex9E
    Skp { x: u8 },
    /// ExA1
    Sknp { x: u8 },
    /// Fx07
    LdVxDt { x: u8 },
    /// Fx0A
    LdVxK { x: u8 },
    /// Fx15
    LdDtVx { x: u8 },
    /// Fx18
    LdStVx { x: u8 },
    /// Fx1E
    AddIVx { x: u8 },
    /// Fx29
    LdFVx { x: u8 },
    /// Fx33
    LdBVx { x: u8 },
    /// Fx55
    LdIVx { x: u8 },
    /// Fx65
    LdVxI { x: u8 },
    /// Anything the instruction set doesn't define
    Unknown(Opcode),
}

impl Instruction {
    /// Selects the Instruction for a given Opcode.
    /// Decoding never touches machine state.
    pub fn decode(op: Opcode) -> Self {
        use Instruction::*;

        let (x, y, n, nn, addr) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Cls,
            (0x0, 0x0, 0xE, 0xE) => Ret,
            (0x1, ..) => Jp { addr },
            (0x2, ..) => Call { addr },
            (0x3, ..) => SeByte { x, nn },
            (0x4, ..) => SneByte { x, nn },
            (0x5, .., 0x0) => SeReg { x, y },
            (0x6, ..) => LdByte { x, nn },
            (0x7, ..) => AddByte { x, nn },
            (0x8, .., 0x0) => LdReg { x, y },
            (0x8, .., 0x1) => Or { x, y },
            (0x8, .., 0x2) => And { x, y },
            (0x8, .., 0x3) => Xor { x, y },
            (0x8, .., 0x4) => AddReg { x, y },
            (0x8, .., 0x5) => Sub { x, y },
            (0x8, .., 0x6) => Shr { x, y },
            (0x8, .., 0x7) => Subn { x, y },
            (0x8, .., 0xE) => Shl { x, y },
            (0x9, .., 0x0) => SneReg { x, y },
            (0xA, ..) => LdI { addr },
            (0xB, ..) => JpV0 { addr },
            (0xC, ..) => Rnd { x, nn },
            (0xD, ..) => Drw { x, y, n },
            (0xE, _, 0x9, 0xE) => Skp { x },
            (0xE, _, 0xA, 0x1) => Sknp { x },
            (0xF, _, 0x0, 0x7) => LdVxDt { x },
            (0xF, _, 0x0, 0xA) => LdVxK { x },
            (0xF, _, 0x1, 0x5) => LdDtVx { x },
            (0xF, _, 0x1, 0x8) => LdStVx { x },
            (0xF, _, 0x1, 0xE) => AddIVx { x },
            (0xF, _, 0x2, 0x9) => LdFVx { x },
            (0xF, _, 0x3, 0x3) => LdBVx { x },
            (0xF, _, 0x5, 0x5) => LdIVx { x },
            (0xF, _, 0x6, 0x5) => LdVxI { x },
            _ => Unknown(op),
        }
    }
}

/// Conventional assembler mnemonics, e.g. `LD V1, 0x22`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp { addr } => write!(f, "JP 0x{:03X}", addr),
            Call { addr } => write!(f, "CALL 0x{:03X}", addr),
            SeByte { x, nn } => write!(f, "SE V{:X}, 0x{:02X}", x, nn),
            SneByte { x, nn } => write!(f, "SNE V{:X}, 0x{:02X}", x, nn),
            SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LdByte { x, nn } => write!(f, "LD V{:X}, 0x{:02X}", x, nn),
            AddByte { x, nn } => write!(f, "ADD V{:X}, 0x{:02X}", x, nn),
            LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Shr { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Shl { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LdI { addr } => write!(f, "LD I, 0x{:03X}", addr),
            JpV0 { addr } => write!(f, "JP V0, 0x{:03X}", addr),
            Rnd { x, nn } => write!(f, "RND V{:X}, 0x{:02X}", x, nn),
            Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Skp { x } => write!(f, "SKP V{:X}", x),
            Sknp { x } => write!(f, "SKNP V{:X}", x),
            LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            LdVxK { x } => write!(f, "LD V{:X}, K", x),
            LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            AddIVx { x } => write!(f, "ADD I, V{:X}", x),
            LdFVx { x } => write!(f, "LD F, V{:X}", x),
            LdBVx { x } => write!(f, "LD B, V{:X}", x),
            LdIVx { x } => write!(f, "LD [I], V{:X}", x),
            LdVxI { x } => write!(f, "LD V{:X}, [I]", x),
            Unknown(op) => write!(f, "DW 0x{}", op),
        }
    }
}

#[cfg(test)]
mod test_instruction {
    use super::Instruction::*;
    use super::*;
    use rstest::rstest;

    fn decode(word: u16) -> Instruction {
        Instruction::decode(Opcode(word))
    }

    #[rstest]
    #[case(0x00E0, Cls)]
    #[case(0x00EE, Ret)]
    #[case(0x1ABC, Jp { addr: 0xABC })]
    #[case(0x2123, Call { addr: 0x123 })]
    #[case(0x3111, SeByte { x: 0x1, nn: 0x11 })]
    #[case(0x4A22, SneByte { x: 0xA, nn: 0x22 })]
    #[case(0x5120, SeReg { x: 0x1, y: 0x2 })]
    #[case(0x6122, LdByte { x: 0x1, nn: 0x22 })]
    #[case(0x7F01, AddByte { x: 0xF, nn: 0x01 })]
    #[case(0x8120, LdReg { x: 0x1, y: 0x2 })]
    #[case(0x8121, Or { x: 0x1, y: 0x2 })]
    #[case(0x8122, And { x: 0x1, y: 0x2 })]
    #[case(0x8123, Xor { x: 0x1, y: 0x2 })]
    #[case(0x8124, AddReg { x: 0x1, y: 0x2 })]
    #[case(0x8125, Sub { x: 0x1, y: 0x2 })]
    #[case(0x8126, Shr { x: 0x1, y: 0x2 })]
    #[case(0x8127, Subn { x: 0x1, y: 0x2 })]
    #[case(0x812E, Shl { x: 0x1, y: 0x2 })]
    #[case(0x9120, SneReg { x: 0x1, y: 0x2 })]
    #[case(0xAABC, LdI { addr: 0xABC })]
    #[case(0xBABC, JpV0 { addr: 0xABC })]
    #[case(0xC30F, Rnd { x: 0x3, nn: 0x0F })]
    #[case(0xD125, Drw { x: 0x1, y: 0x2, n: 0x5 })]
    #[case(0xE19E, Skp { x: 0x1 })]
    #[case(0xE1A1, Sknp { x: 0x1 })]
    #[case(0xF107, LdVxDt { x: 0x1 })]
    #[case(0xF10A, LdVxK { x: 0x1 })]
    #[case(0xF115, LdDtVx { x: 0x1 })]
    #[case(0xF118, LdStVx { x: 0x1 })]
    #[case(0xF11E, AddIVx { x: 0x1 })]
    #[case(0xF129, LdFVx { x: 0x1 })]
    #[case(0xF133, LdBVx { x: 0x1 })]
    #[case(0xF455, LdIVx { x: 0x4 })]
    #[case(0xF465, LdVxI { x: 0x4 })]
    fn test_decodes(#[case] word: u16, #[case] expected: Instruction) {
        assert_eq!(decode(word), expected);
    }

    #[rstest]
    #[case(0x0000)]
    #[case(0x0123)]
    #[case(0x5121)]
    #[case(0x8128)]
    #[case(0x812F)]
    #[case(0x9121)]
    #[case(0xE19F)]
    #[case(0xE000)]
    #[case(0xF1FF)]
    #[case(0xF100)]
    fn test_unassigned_words_decode_to_unknown(#[case] word: u16) {
        assert_eq!(decode(word), Unknown(Opcode(word)));
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(decode(0x6122).to_string(), "LD V1, 0x22");
        assert_eq!(decode(0xD015).to_string(), "DRW V0, V1, 5");
        assert_eq!(decode(0xF355).to_string(), "LD [I], V3");
        assert_eq!(decode(0x2ABC).to_string(), "CALL 0xABC");
        assert_eq!(decode(0xFFFF).to_string(), "DW 0xFFFF");
    }
}
