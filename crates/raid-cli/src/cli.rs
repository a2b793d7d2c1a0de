use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use raid_engine::config::{self, DeviceSpec, RaidConfig};

#[derive(Parser, Debug)]
#[command(name = "raid-cli", author, version, about)]
pub struct Cli {
    /// Log every logical read and write.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble an array and export it as `<mount-point>/raid` until interrupted.
    Mount(MountArgs),

    /// Create zero-filled image files to back an array.
    Create(CreateArgs),

    /// Assemble an array, print its state and verify redundancy.
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ArrayArgs {
    #[arg(long, value_enum, env = "RAID_LEVEL")]
    pub raid: RaidMode,

    #[arg(long, env = "RAID_BLOCK_SIZE", value_parser = config::parse_block_size)]
    pub block_size: u64,

    /// RAID4 only. Defaults to the last device.
    #[arg(long)]
    pub parity_index: Option<usize>,

    /// Member devices in order. `MISSING` marks an absent member; a `+` prefix marks a
    /// fresh member to rebuild before serving.
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub devices: Vec<DeviceSpec>,
}

impl ArrayArgs {
    #[must_use]
    pub fn to_config(&self) -> RaidConfig {
        let config = RaidConfig::new(self.raid.into(), self.block_size, self.devices.clone());
        match self.parity_index {
            Some(p) => config.with_parity_index(p),
            None => config,
        }
    }
}

#[derive(Args, Debug)]
pub struct MountArgs {
    #[command(flatten)]
    pub array: ArrayArgs,

    #[arg(long, env = "RAID_MOUNT_POINT")]
    pub mount_point: PathBuf,

    /// Let users other than the owner open the exported device.
    #[arg(long)]
    pub allow_other: bool,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Image size in bytes; `K`, `M` and `G` suffixes are binary multiples.
    #[arg(long, value_parser = parse_size)]
    pub size: u64,

    /// Overwrite existing files.
    #[arg(long)]
    pub force: bool,

    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub array: ArrayArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RaidMode {
    Raid0,
    Raid1,
    Raid4,
}

impl From<RaidMode> for config::RaidMode {
    fn from(mode: RaidMode) -> Self {
        match mode {
            RaidMode::Raid0 => Self::Raid0,
            RaidMode::Raid1 => Self::Raid1,
            RaidMode::Raid4 => Self::Raid4,
        }
    }
}

/// `parse_size` reads a byte count with an optional binary suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let (digits, shift) = match s.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => (&s[..s.len() - 1], 10),
        Some('M') => (&s[..s.len() - 1], 20),
        Some('G') => (&s[..s.len() - 1], 30),
        _ => (s, 0),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("'{s}' is not a size"))?;
    if value == 0 {
        return Err("size must be greater than zero".to_string());
    }
    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| format!("'{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn mount_parses_devices_and_markers() {
        let cli = Cli::try_parse_from([
            "raid-cli",
            "-v",
            "mount",
            "--raid",
            "raid4",
            "--block-size",
            "4096",
            "--mount-point",
            "/mnt/raid",
            "/dev/sdb",
            "MISSING",
            "/dev/sdd",
        ])
        .expect("parse");

        assert!(cli.verbose);
        let Command::Mount(args) = cli.command else {
            panic!("expected mount");
        };
        assert_eq!(args.mount_point, Path::new("/mnt/raid"));
        assert!(!args.allow_other);

        let config = args.array.to_config();
        assert_eq!(config.mode, config::RaidMode::Raid4);
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.parity_index, None);
        assert_eq!(config.missing_index(), Some(1));
        config.validate().expect("valid");
    }

    #[test]
    fn check_accepts_rebuild_prefix_and_parity_index() {
        let cli = Cli::try_parse_from([
            "raid-cli",
            "check",
            "--raid",
            "raid4",
            "--block-size",
            "512",
            "--parity-index",
            "0",
            "a.img",
            "+b.img",
            "c.img",
        ])
        .expect("parse");

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        let config = args.array.to_config();
        assert_eq!(config.parity_index, Some(0));
        assert_eq!(config.devices[1], DeviceSpec::Rebuild(PathBuf::from("b.img")));
        assert_eq!(config.rebuild_index(), Some(1));
    }

    #[test]
    fn bad_block_size_is_rejected_by_parser() {
        for bad in ["0", "abc", "-1"] {
            let res = Cli::try_parse_from([
                "raid-cli",
                "check",
                "--raid",
                "raid0",
                "--block-size",
                bad,
                "a.img",
                "b.img",
            ]);
            assert!(res.is_err(), "block size {bad} must be rejected");
        }
    }

    #[test]
    fn devices_are_required() {
        let res = Cli::try_parse_from(["raid-cli", "check", "--raid", "raid1", "--block-size", "512"]);
        assert!(res.is_err());
    }

    #[test]
    fn create_parses_size_suffixes() {
        let cli = Cli::try_parse_from(["raid-cli", "create", "--size", "64M", "x.img", "y.img"])
            .expect("parse");
        let Command::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.size, 64 << 20);
        assert_eq!(args.paths.len(), 2);
        assert!(!args.force);
    }

    #[test]
    fn parse_size_handles_suffixes_and_errors() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("8k"), Ok(8192));
        assert_eq!(parse_size("1G"), Ok(1 << 30));
        assert!(parse_size("0").is_err());
        assert!(parse_size("M").is_err());
        assert!(parse_size("99999999999G").is_err());
    }
}
