/// Continuous aggregate view and the hypertable it materializes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuousAggregate {
    pub view_name: String,
    pub materialization_schema: String,
    pub materialization_name: String,
}

/// Primary time dimension of a hypertable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeColumn {
    pub name: String,
    pub data_type: String,
}

impl TimeColumn {
    /// Integer time columns have no wall-clock meaning.
    pub fn is_timestamp(&self) -> bool {
        matches!(
            self.data_type.as_str(),
            "timestamp with time zone" | "timestamp without time zone" | "date"
        )
    }
}
