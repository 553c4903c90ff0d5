use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;

use super::grammar::MISSING_MARKER;
use super::model::{Dataset, Target, TargetKind};

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Write the whole dataset (metadata and instances) as pretty JSON.
pub fn to_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, dataset).context("writing JSON")?;
    info!("wrote {} instances to {}", dataset.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// CSV layout: one row per instance.
/// `dim_<k>` columns hold semicolon-separated points with `?` for missing:
///   `"0.12;?;0.11"`
/// followed by a `target` column when the dataset carries targets.
pub fn to_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    let has_target = dataset.metadata.target_label;

    let mut headers: Vec<String> = (0..dataset.n_channels()).map(|k| format!("dim_{k}")).collect();
    if has_target {
        headers.push("target".to_string());
    }
    writer.write_record(&headers).context("writing CSV headers")?;

    for (row, instance) in dataset.instances.iter().enumerate() {
        let mut record: Vec<String> = instance
            .channels
            .iter()
            .map(|ch| {
                ch.values
                    .iter()
                    .map(|v| v.map_or_else(|| MISSING_MARKER.to_string(), |x| x.to_string()))
                    .collect::<Vec<_>>()
                    .join(";")
            })
            .collect();
        if has_target {
            record.push(instance.target.as_ref().map(Target::to_string).unwrap_or_default());
        }
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    writer.flush().context("flushing CSV")?;
    info!("wrote {} instances to {}", dataset.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet export
// ---------------------------------------------------------------------------

/// Parquet schema:
/// - `dim_<k>`: List<Float64>, missing points stored as nulls
/// - `target`: Utf8 for class labels, Float64 for regression (if present)
pub fn to_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let batch = to_record_batch(dataset)?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    info!("wrote {} instances to {}", dataset.len(), path.display());
    Ok(())
}

/// Build the Arrow batch written by [`to_parquet`].
pub fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for k in 0..dataset.n_channels() {
        let mut builder = ListBuilder::new(Float64Builder::new());
        for instance in &dataset.instances {
            let values = builder.values();
            for v in &instance.channels[k].values {
                values.append_option(*v);
            }
            builder.append(true);
        }
        fields.push(Field::new(
            format!("dim_{k}"),
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ));
        columns.push(Arc::new(builder.finish()));
    }

    match dataset.target_kind() {
        Some(TargetKind::Classification) => {
            let labels: Vec<Option<&str>> = dataset
                .instances
                .iter()
                .map(|i| i.target.as_ref().and_then(Target::as_label))
                .collect();
            fields.push(Field::new("target", DataType::Utf8, true));
            columns.push(Arc::new(StringArray::from(labels)));
        }
        Some(TargetKind::Regression) => {
            let values: Vec<Option<f64>> = dataset
                .instances
                .iter()
                .map(|i| i.target.as_ref().and_then(Target::as_f64))
                .collect();
            fields.push(Field::new("target", DataType::Float64, true));
            columns.push(Arc::new(Float64Array::from(values)));
        }
        None => {}
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building record batch")
}
