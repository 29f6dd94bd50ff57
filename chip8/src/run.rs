use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use log::{debug, error, info};

use chip8_vm::constants::TIMER_FREQUENCY;
use chip8_vm::{Chip8, Quirks};

use crate::keymap::held_keys;

/// Everything the run loop needs to know, gathered from the command line.
pub struct Settings {
    pub rom: PathBuf,
    pub instructions_per_frame: u32,
    pub frames: Option<u64>,
    pub seed: Option<u64>,
    pub keys: String,
    pub quirks: Quirks,
    pub fast: bool,
}

/// Runs a ROM headless until it faults or the frame limit is reached.
///
/// Each 60Hz frame executes `instructions_per_frame` instructions and ticks the timers once.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    let builder = Chip8::builder().quirks(settings.quirks);
    let mut chip8 = match settings.seed {
        Some(seed) => builder.seed(seed).build(),
        None => builder.build(),
    };

    // Load ROM
    let program = chip8
        .load_file(&settings.rom)
        .with_context(|| format!("unable to load {}", settings.rom.display()))?;
    info!("successfully loaded {} ({} bytes)", program.name, program.size);
    debug!("quirks: {:?}", chip8.quirks());

    let keys = held_keys(&settings.keys)
        .map_err(|key| anyhow!("{:?} is not mapped to the keypad", key))?;
    for key in keys {
        chip8.key_press(key)?;
    }

    // Set initial timing
    let frame_time = Duration::from_secs(1) / TIMER_FREQUENCY;
    let mut last_frame = Instant::now();
    let mut buzzing = false;
    let mut frame: u64 = 0;

    while settings.frames.map_or(true, |limit| frame < limit) {
        if let Err(fault) = chip8.step_frame(settings.instructions_per_frame) {
            error!("{}\n{}", fault, chip8.state().register_dump());
            return Err(fault.into());
        }
        frame += 1;

        if chip8.buzzer_active() != buzzing {
            buzzing = !buzzing;
            info!("buzzer {}", if buzzing { "on" } else { "off" });
        }

        // Handle timing
        let elapsed_frame_time = last_frame.elapsed();
        if !settings.fast && frame_time > elapsed_frame_time {
            std::thread::sleep(frame_time - elapsed_frame_time);
        }
        last_frame = Instant::now();
    }

    info!("stopped after {} frames at pc {:#05X}", frame, chip8.state().pc);
    Ok(())
}
