pub mod shape;
pub mod summary;

pub use shape::{detect, ResultsPayload, Shape, SingleTargetResult, TargetResult, PRIMARY_TARGET};
pub use summary::{bar_width, severity_histogram, summarize, SeverityBar, SeverityCounts, Summary};
