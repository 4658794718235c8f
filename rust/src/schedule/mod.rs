//! Schedule data model: persistent partial schedules and finished output.

mod output;
mod partial;
mod ready;

pub use output::OutputSchedule;
pub use partial::{
    Ancestors, PartialSchedule, Placement, PlacementLookup, ProcessorId, ProcessorTail,
};
pub use ready::ReadyTable;
