use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::opcode::Opcode;

/// Reasons a program can't be loaded. Memory is never modified when loading fails.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program is {size} bytes but only {max} fit above the program start address")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read ROM file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to read ROM")]
    Read(#[from] io::Error),
}

/// Faults raised while executing a program.
///
/// `pc` is always the address of the instruction that faulted. A faulting instruction leaves
/// the machine exactly as it was before it executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown instruction {opcode} at {pc:#05X}")]
    UnknownInstruction { opcode: Opcode, pc: u16 },

    #[error("call at {pc:#05X} overflowed the call stack")]
    StackOverflow { pc: u16 },

    #[error("return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("instruction at {pc:#05X} accessed memory out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize, pc: u16 },

    #[error("key {key:#04X} is not on the hex keypad")]
    KeyOutOfRange { key: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_messages_name_the_instruction() {
        let fault = Fault::UnknownInstruction {
            opcode: Opcode(0xF1FF),
            pc: 0x204,
        };
        assert_eq!(fault.to_string(), "unknown instruction F1FF at 0x204");
    }

    #[test]
    fn test_too_large_message() {
        let err = LoadError::ProgramTooLarge {
            size: 4000,
            max: 3584,
        };
        assert_eq!(
            err.to_string(),
            "program is 4000 bytes but only 3584 fit above the program start address"
        );
    }
}
