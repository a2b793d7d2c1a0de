use anyhow::{Context, Result, bail};
use raid_engine::retention::disk::Disk;
use tracing::info;

use crate::cli::CreateArgs;

/// Creates zero-filled image files for a file-backed array.
pub(crate) fn run_create(args: &CreateArgs) -> Result<()> {
    for path in &args.paths {
        if path.exists() && !args.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }
    }

    for path in &args.paths {
        let disk = Disk::create(path, args.size)
            .with_context(|| format!("failed to create image {}", path.display()))?;
        info!("created '{}', size {} bytes", path.display(), disk.len());
    }
    Ok(())
}
