use std::future::Future;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value,
};
use serde::{Deserialize, Serialize};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{RequestContext, Sensor};
use crate::error::StorageError;

pub const QUERY_CREATE: &str = "INSERT INTO sensors (id, site_id, name, unit, min_safe, max_safe) VALUES ($1, $2, $3, $4, $5, $6)";
pub const QUERY_ALL: &str =
    "SELECT id, site_id, name, unit, min_safe, max_safe FROM sensors WHERE site_id = $1";
pub const QUERY_GET: &str =
    "SELECT id, site_id, name, unit, min_safe, max_safe FROM sensors WHERE id = $1";
pub const QUERY_UPDATE: &str = "UPDATE sensors SET site_id = $2, name = $3, unit = $4, min_safe = $5, max_safe = $6 WHERE id = $1";
pub const QUERY_DELETE: &str = "DELETE FROM sensors WHERE id = $1";

/// Fields of a sensor that a client supplies; the identifier is assigned on create.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSensor {
    pub site_id: String,
    pub name: String,
    pub unit: String,
    pub min_safe: f64,
    pub max_safe: f64,
}

/// CRUD operations for [`Sensor`].
#[async_trait]
pub trait SensorManager: Send + Sync {
    /// Persist a new sensor under a freshly generated identifier.
    async fn create(&self, cx: &RequestContext, new: NewSensor) -> Result<Sensor, StorageError>;

    /// All sensors of a site. Rows that cannot be decoded are skipped.
    async fn all(&self, cx: &RequestContext, site_id: &str) -> Result<Vec<Sensor>, StorageError>;

    /// `Ok(None)` when no sensor has this identifier.
    async fn get(&self, cx: &RequestContext, id: &str) -> Result<Option<Sensor>, StorageError>;

    /// Replace every field but the identifier. Returns the number of rows changed.
    async fn update(&self, cx: &RequestContext, sensor: &Sensor) -> Result<u64, StorageError>;

    /// Remove a sensor. Deleting an unknown identifier succeeds.
    async fn delete(&self, cx: &RequestContext, id: &str) -> Result<(), StorageError>;
}

/// [`SensorManager`] issuing parameterized Postgres statements.
///
/// Spans and log events of every operation go to the injected `dispatch`
/// rather than the process-wide default subscriber.
pub struct PostgresSensorManager {
    db: DatabaseConnection,
    dispatch: Dispatch,
}

impl PostgresSensorManager {
    #[must_use]
    pub fn new(db: DatabaseConnection, dispatch: Dispatch) -> Self {
        Self { db, dispatch }
    }

    /// Hand back the underlying connection.
    #[must_use]
    pub fn into_connection(self) -> DatabaseConnection {
        self.db
    }

    fn statement<I>(sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
    }

    /// Run one store call inside a span tagged with the operation and statement.
    async fn exec<T, F>(
        &self,
        cx: &RequestContext,
        operation: &'static str,
        query: &'static str,
        fut: F,
    ) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>> + Send,
        T: Send,
    {
        // Created under the injected dispatch so the caller's current span
        // in that dispatch becomes the parent.
        let span = tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info_span!(
                "sensor_store",
                otel.name = operation,
                operation,
                db.system = "sql",
                db.statement = query
            )
        });

        async move {
            let result = cx.run(fut).await;
            match &result {
                Ok(_) => tracing::debug!(event = operation, message = "successful!"),
                Err(e) => tracing::error!("{e}"),
            }
            result
        }
        .instrument(span)
        .with_subscriber(self.dispatch.clone())
        .await
    }
}

#[async_trait]
impl SensorManager for PostgresSensorManager {
    async fn create(&self, cx: &RequestContext, new: NewSensor) -> Result<Sensor, StorageError> {
        let sensor = Sensor {
            id: Uuid::new_v4().to_string(),
            site_id: new.site_id,
            name: new.name,
            unit: new.unit,
            min_safe: new.min_safe,
            max_safe: new.max_safe,
        };

        let stmt = Self::statement(
            QUERY_CREATE,
            [
                Value::from(sensor.id.clone()),
                Value::from(sensor.site_id.clone()),
                Value::from(sensor.name.clone()),
                Value::from(sensor.unit.clone()),
                Value::from(sensor.min_safe),
                Value::from(sensor.max_safe),
            ],
        );

        self.exec(cx, "insert-record", QUERY_CREATE, async {
            self.db.execute(stmt).await?;
            Ok::<_, StorageError>(())
        })
        .await?;

        Ok(sensor)
    }

    async fn all(&self, cx: &RequestContext, site_id: &str) -> Result<Vec<Sensor>, StorageError> {
        let stmt = Self::statement(QUERY_ALL, [Value::from(site_id)]);

        self.exec(cx, "select-records", QUERY_ALL, async {
            let rows = self.db.query_all(stmt).await?;
            let total = rows.len();

            let sensors: Vec<Sensor> = rows
                .iter()
                .filter_map(|row| match Sensor::from_query_result(row, "") {
                    Ok(sensor) => Some(sensor),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping undecodable sensor row");
                        None
                    }
                })
                .collect();

            if sensors.len() < total {
                tracing::debug!(total, decoded = sensors.len(), "Partial sensor read");
            }
            Ok::<_, StorageError>(sensors)
        })
        .await
    }

    async fn get(&self, cx: &RequestContext, id: &str) -> Result<Option<Sensor>, StorageError> {
        let stmt = Self::statement(QUERY_GET, [Value::from(id)]);

        self.exec(cx, "select-record", QUERY_GET, async {
            match self.db.query_one(stmt).await? {
                Some(row) => Sensor::from_query_result(&row, "")
                    .map(Some)
                    .map_err(StorageError::Decode),
                // record does not exist
                None => Ok(None),
            }
        })
        .await
    }

    async fn update(&self, cx: &RequestContext, sensor: &Sensor) -> Result<u64, StorageError> {
        let stmt = Self::statement(
            QUERY_UPDATE,
            [
                Value::from(sensor.id.clone()),
                Value::from(sensor.site_id.clone()),
                Value::from(sensor.name.clone()),
                Value::from(sensor.unit.clone()),
                Value::from(sensor.min_safe),
                Value::from(sensor.max_safe),
            ],
        );

        self.exec(cx, "update-record", QUERY_UPDATE, async {
            let res = self.db.execute(stmt).await?;
            Ok::<_, StorageError>(res.rows_affected())
        })
        .await
    }

    async fn delete(&self, cx: &RequestContext, id: &str) -> Result<(), StorageError> {
        let stmt = Self::statement(QUERY_DELETE, [Value::from(id)]);

        self.exec(cx, "delete-record", QUERY_DELETE, async {
            self.db.execute(stmt).await?;
            Ok::<_, StorageError>(())
        })
        .await
    }
}

