pub mod analyzer;
pub mod gems;
pub mod scan;
pub mod signals;
pub mod store;

pub use analyzer::{analyze_snapshot, AnalyzerConfig, BatchAnalyzer, BatchFailure, BatchOutcome};
pub use gems::{find_gems, GemCriteria};
pub use scan::ScanFilter;
pub use store::AnalysisStore;
