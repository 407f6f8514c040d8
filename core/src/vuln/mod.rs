pub mod classifier;
pub mod extractor;
pub mod model;
pub mod store;

pub use classifier::{classify_nikto, classify_nuclei};
pub use extractor::{extract, extract_payload};
pub use model::{Severity, ToolSource, Vulnerability};
pub use store::VulnerabilityLog;
