use anyhow::{Context, Result, anyhow};
use fuser::MountOption;
use raid_engine::{BlockDevice, Volume};
use tracing::info;

use crate::cli::MountArgs;
use crate::fs::{BlockFs, DEVICE_NAME};
use crate::metrics_runtime;

/// Assembles the array (running any requested rebuild first), exports it and serves
/// until SIGINT or SIGTERM.
pub(crate) async fn run_mount(args: MountArgs) -> Result<()> {
    let mount_point = args.mount_point;
    std::fs::create_dir_all(&mount_point)
        .with_context(|| format!("failed to create mount point {}", mount_point.display()))?;

    let counters = metrics_runtime::install();
    let config = args.array.to_config();
    let volume = tokio::task::spawn_blocking(move || Volume::assemble(&config))
        .await
        .context("array assembly task failed")?
        .context("failed to assemble array")?;

    info!(
        "exporting {} bytes as {}",
        volume.size_bytes(),
        mount_point.join(DEVICE_NAME).display()
    );

    let fs = BlockFs::new(volume, Some(counters.clone()));
    let state = fs.state.clone();
    let mut options = vec![MountOption::RW, MountOption::FSName("raid-engine".into())];
    if args.allow_other {
        options.push(MountOption::AllowOther);
    }

    let session = fuser::spawn_mount2(fs, &mount_point, &options)
        .with_context(|| format!("failed to mount filesystem at {}", mount_point.display()))?;

    wait_for_shutdown().await?;

    // Unmounts and waits for the session thread; `destroy` disconnects the device.
    session.join();

    let mut device = state
        .lock()
        .map_err(|_| anyhow!("device state poisoned by a panicked request"))?;
    device.flush().context("final flush failed")?;

    info!("exit: {}", counters.snapshot());
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).context("install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res.context("listen for ctrl-c")?;
            info!("shutdown: ctrl-c");
        },
        _ = sigterm.recv() => {
            info!("shutdown: SIGTERM");
        },
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("shutdown: ctrl-c");
    Ok(())
}
