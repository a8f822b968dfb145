pub mod company;
pub mod registry;
pub mod summary;

pub use company::{Company, Filing, Officer};
pub use registry::{CompanyProfile, FilingHistory, FilingRecord, OfficerList, OfficerRecord};
pub use summary::{AggregationError, YearCount, summarize, summary_batch};
