pub mod dispenser;
pub mod refill_log;
pub mod schedule;
pub mod usage_info;
pub mod weekdays;

pub use dispenser::Dispenser;
pub use refill_log::{RefillExport, RefillLog, RefillPayload};
pub use schedule::{Interval, Schedule, ScheduleKind, TimeRange};
pub use usage_info::UsageInfo;
pub use weekdays::WeekdaySet;
