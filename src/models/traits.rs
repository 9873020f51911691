//! Trait definitions for domain models
//!
//! This module defines the traits shared by the record types: keyed access for
//! the joins, year access for "most recent" reductions, and Arrow conversion
//! for the Parquet exports.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_schema::{FieldRef, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::{AnalysisError, Result};
use crate::utils::text::normalize_key;

/// A record that belongs to one entity (a country).
pub trait EntityKeyed {
    /// The entity identifier as it appears in the source
    fn entity_id(&self) -> &str;

    /// The normalised key used for matching across datasets
    fn join_key(&self) -> String {
        normalize_key(self.entity_id())
    }
}

/// A record observed in a specific year.
pub trait Dated {
    /// The observation or reporting year
    fn year(&self) -> i32;
}

/// A trait for models that can be converted to and from Arrow `RecordBatch`.
///
/// The schema is traced from the serde representation of the model, so
/// `Option` fields become nullable columns.
pub trait ArrowSchema: Sized + Serialize + DeserializeOwned {
    /// Get the Arrow fields for this model
    fn fields() -> Result<Vec<FieldRef>> {
        Vec::<FieldRef>::from_type::<Self>(TracingOptions::default())
            .map_err(|e| AnalysisError::serialization(format!("Schema tracing error: {e}")).into())
    }

    /// Get the Arrow schema for this model
    fn schema_ref() -> Result<Arc<Schema>> {
        Ok(Arc::new(Schema::new(Self::fields()?)))
    }

    /// Convert a slice of this model to a `RecordBatch`
    fn to_record_batch(models: &[Self]) -> Result<RecordBatch> {
        let fields = Self::fields()?;
        serde_arrow::to_record_batch(&fields, &models)
            .map_err(|e| AnalysisError::serialization(format!("Serialization error: {e}")).into())
    }

    /// Convert a `RecordBatch` back to a vector of this model
    fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        serde_arrow::from_record_batch::<Vec<Self>>(batch)
            .map_err(|e| AnalysisError::serialization(format!("Failed to deserialize: {e}")).into())
    }
}
