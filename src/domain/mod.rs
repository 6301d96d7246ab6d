// Domain layer: kiosk entities and the ERP port.

pub mod class_session;
pub mod errors;
pub mod member;
pub mod outcome;
pub mod ports;

pub use class_session::{AttendanceEntry, ClassSessionCandidate, MemberInfo};
pub use errors::BackendError;
pub use member::{InputMode, ResolvedMember};
pub use outcome::{CheckinOutcome, CheckinStatus};
pub use ports::KioskBackend;
