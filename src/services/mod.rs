pub mod actions;
pub mod connectivity;
pub mod status_sync;

pub use actions::SyncCore;
pub use connectivity::ConnectivityMonitor;
pub use status_sync::{StatusSync, StatusSyncHandle};
