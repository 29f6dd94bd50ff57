use std::path::PathBuf;

use clap::Parser;

use chip8_vm::constants::DEFAULT_INSTRUCTIONS_PER_FRAME;
use chip8_vm::Quirks;

mod keymap;
mod run;

/// Runs a Chip-8 ROM without a display.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions executed per 60Hz frame
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_FRAME)]
    ipf: u32,

    /// Stop after this many frames instead of running until the program faults
    #[arg(long)]
    frames: Option<u64>,

    /// Seed for RND, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Keys held down for the whole run, using the 1234/QWER/ASDF/ZXCV layout
    #[arg(long, default_value = "")]
    keys: String,

    /// LD [I], Vx and LD Vx, [I] leave I unchanged
    #[arg(long)]
    load_store_leaves_i: bool,

    /// SHR and SHL shift Vy into Vx
    #[arg(long)]
    shift_uses_vy: bool,

    /// Don't pace frames at 60Hz
    #[arg(long)]
    fast: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run::run(run::Settings {
        rom: args.rom,
        instructions_per_frame: args.ipf,
        frames: args.frames,
        seed: args.seed,
        keys: args.keys,
        quirks: Quirks {
            load_store_leaves_i: args.load_store_leaves_i,
            shift_uses_vy: args.shift_uses_vy,
        },
        fast: args.fast,
    })
}
