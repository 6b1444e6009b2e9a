use usage_core::MonitoredEntity;

use crate::Db;
use crate::error::Result;
use crate::types::{ContinuousAggregate, TimeColumn};

impl Db {
    pub async fn list_hypertables(&mut self, source_schema: &str) -> Result<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(
            r#"
            SELECT hypertable_name::text
            FROM timescaledb_information.hypertables
            WHERE hypertable_schema = $1
            ORDER BY hypertable_name
            "#,
        )
        .bind(source_schema)
        .fetch_all(&mut self.conn)
        .await?;
        Ok(tables)
    }

    pub async fn list_continuous_aggregates(
        &mut self,
        source_schema: &str,
    ) -> Result<Vec<ContinuousAggregate>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT view_name::text,
                   materialization_hypertable_schema::text,
                   materialization_hypertable_name::text
            FROM timescaledb_information.continuous_aggregates
            WHERE view_schema = $1
            ORDER BY view_name
            "#,
        )
        .bind(source_schema)
        .fetch_all(&mut self.conn)
        .await?;
        Ok(rows
            .into_iter()
            .map(
                |(view_name, materialization_schema, materialization_name)| ContinuousAggregate {
                    view_name,
                    materialization_schema,
                    materialization_name,
                },
            )
            .collect())
    }

    /// First time dimension of the entity's hypertable, if it has one.
    pub async fn time_column(&mut self, entity: &MonitoredEntity) -> Result<Option<TimeColumn>> {
        let row = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT column_name::text, column_type::text
            FROM timescaledb_information.dimensions
            WHERE hypertable_schema = $1
              AND hypertable_name = $2
              AND dimension_type = 'Time'
            ORDER BY dimension_number
            LIMIT 1
            "#,
        )
        .bind(&entity.namespace)
        .bind(&entity.physical_name)
        .fetch_optional(&mut self.conn)
        .await?;
        Ok(row.map(|(name, data_type)| TimeColumn { name, data_type }))
    }
}
