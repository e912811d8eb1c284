pub mod ledger;
pub mod notice;

pub use ledger::{PendingReorder, ReorderLedger, ReorderParent, ReorderState, ReorderTarget};
pub use notice::{Notice, NoticeLevel, NoticeQueue};

/// How an optimistic reorder ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The server accepted the new position
    Confirmed,
    /// The server rejected the move and the previous order was restored
    RolledBack,
}
