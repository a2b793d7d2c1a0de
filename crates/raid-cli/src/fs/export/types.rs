use std::sync::{Arc, Mutex};

use raid_engine::{BlockDevice, Volume};

use crate::metrics_runtime::IoCounters;

/// Exported is a block device the FUSE layer can serve, plus the text of its status
/// file.
pub trait Exported: BlockDevice + Send + 'static {
    fn status_text(&self) -> String;
}

impl Exported for Volume {
    fn status_text(&self) -> String {
        format!(
            "level: {}\nblock size: {}\ncapacity: {}\nstate: {:?}\n{}",
            self.level().mode(),
            self.block_size(),
            self.capacity(),
            self.state(),
            self.disk_status_string()
        )
    }
}

/// BlockFs presents one device as the file `raid` in the mount root, next to a
/// read-only `status` file.
pub struct BlockFs<B: Exported> {
    pub state: Arc<Mutex<B>>,
    pub capacity: u64,
    pub counters: Option<Arc<IoCounters>>,
}

impl<B: Exported> BlockFs<B> {
    pub fn new(device: B, counters: Option<Arc<IoCounters>>) -> Self {
        let capacity = device.size_bytes();
        Self {
            state: Arc::new(Mutex::new(device)),
            capacity,
            counters,
        }
    }
}
