pub use chip8::{Chip8, Chip8Builder};
pub use errors::{Fault, LoadError};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::ProgramInfo;
pub use quirks::Quirks;
pub use state::{FrameBuffer, State};

mod chip8;
pub mod constants;
mod errors;
mod instruction;
mod opcode;
mod operations;
mod program;
mod quirks;
pub mod state;
