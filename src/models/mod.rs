//! Data models for LabLoan

pub mod enums;
pub mod equipment;
pub mod history;
pub mod notification;
pub mod request;

// Re-export commonly used types
pub use enums::{BatchPolicy, HistoryEntryType, NotificationType, RequestStatus, ReturnCondition};
pub use equipment::EquipmentRecord;
pub use history::HistoryEntry;
pub use notification::Notification;
pub use request::{LoanRequest, ReturnDetails};
