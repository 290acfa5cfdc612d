mod inventory;
mod notification;

pub use inventory::{ComputeInventory, CreateImageRequest};
pub use notification::{ChatNotifier, DigestMessage, DigestSection, ReportNotifier};
