pub mod confounds;
pub mod report;
