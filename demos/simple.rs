//! Runs a simulation and prints the displacement at the center of the membrane.
//!
//! Usage: `cargo run --example simple [config.toml]`

use fdm_pulse::{Frame, SimulationConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_file(&path)?,
        None => SimulationConfig::default(),
    };
    let mut solver = config.build()?;

    let (nx, ny) = solver.domain().dim();
    let center = (nx / 2, ny / 2);
    solver.run(|frame: Frame| {
        println!(
            "{:4}  t = {:6.2}  u{:?} = {:+.6}",
            frame.step, frame.time, center, frame.field[center]
        );
    })?;

    Ok(())
}
