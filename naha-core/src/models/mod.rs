pub mod measurement;
pub mod record;

// re-export for cleaner imports
pub use self::measurement::{GlycosylationCount, MergedRecord, StalkMeasurement};
pub use self::record::SequenceRecord;
