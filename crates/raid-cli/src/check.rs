use anyhow::{Context, Result, bail};
use raid_engine::Volume;
use raid_engine::retention::array::ArrayState;

use crate::cli::CheckArgs;

/// Assembles the array, prints a summary and verifies redundancy when every device is
/// healthy.
pub(crate) fn run_check(args: &CheckArgs) -> Result<()> {
    let volume = Volume::assemble(&args.array.to_config()).context("failed to assemble array")?;
    print!("{}", summary(&volume));
    println!("verify: {}", verify(&volume)?);
    Ok(())
}

fn summary(volume: &Volume) -> String {
    format!(
        "level: {}\nblock size: {}\ncapacity: {} bytes\n{}",
        volume.level().mode(),
        volume.block_size(),
        volume.capacity(),
        volume.disk_status_string()
    )
}

/// One-line verdict; mismatches are an error so the process exits non-zero.
fn verify(volume: &Volume) -> Result<String> {
    if !volume.level().mode().is_redundant() {
        return Ok("skipped, no redundancy".to_string());
    }
    if let ArrayState::Degraded { missing } = volume.state() {
        return Ok(format!("skipped, device {missing} is missing"));
    }

    let mismatches = volume.verify().context("redundancy verify failed")?;
    if !mismatches.is_empty() {
        bail!(
            "{} device blocks disagree with their redundancy: {mismatches:?}",
            mismatches.len()
        );
    }
    Ok("consistent".to_string())
}
