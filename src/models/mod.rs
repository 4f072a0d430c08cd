pub mod agenda;
pub mod area;
pub mod halqa;
pub mod meeting;
pub mod stats;

pub use agenda::AgendaItem;
pub use area::Area;
pub use halqa::{Halqa, Member};
pub use meeting::{Meeting, MeetingPatch, MeetingStatus};
pub use stats::{AreaStats, WeeklyReport};
