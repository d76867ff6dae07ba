/// Errors produced while constructing network bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundsError {
    #[error("inconsistent network bounds: begin seq {begin}, end seq {end}")]
    InconsistentSequences { begin: u64, end: u64 },

    #[error("inconsistent network bounds: end closes before begin ({begin} > {end})")]
    InconsistentCloseTimes {
        begin: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },
}
