use parking_lot::Mutex;
use tracing::info;

/// In-memory record of the coordinates installed by this process, in
/// first-install order.
#[derive(Debug, Default)]
pub struct InstallLedger {
    entries: Mutex<Vec<String>>,
}

impl InstallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `coordinates` unless already present. Returns `true` on first
    /// insertion.
    pub fn install(&self, coordinates: &str) -> bool {
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry == coordinates) {
            return false;
        }

        info!(target: "ledger", %coordinates, "install");
        entries.push(coordinates.to_string());
        metrics::counter!("grab_installs_count").increment(1);
        true
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
