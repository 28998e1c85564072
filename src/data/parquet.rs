//! Parquet readers and writers for panels and run outputs

use crate::backtest::ReturnSeries;
use crate::panel::{PriceEntry, RatioEntry};
use anyhow::{anyhow, bail, Context};
use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Date32Type, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ENTITY_COLUMN: &str = "entity_id";
const DATE_COLUMN: &str = "date";
const RETURN_COLUMN: &str = "ret";

fn date_at(dates: &Date32Array, i: usize) -> anyhow::Result<NaiveDate> {
    dates
        .value_as_date(i)
        .ok_or_else(|| anyhow!("Date32 value {} out of range", dates.value(i)))
}

/// Price panel schema
pub fn price_schema() -> Schema {
    Schema::new(vec![
        Field::new(ENTITY_COLUMN, DataType::Utf8, false),
        Field::new(DATE_COLUMN, DataType::Date32, false),
        Field::new(RETURN_COLUMN, DataType::Float64, false),
    ])
}

/// Ratio panel schema, one Float64 column per feature
pub fn ratio_schema(feature_names: &[String]) -> Schema {
    let mut fields = vec![
        Field::new(ENTITY_COLUMN, DataType::Utf8, false),
        Field::new(DATE_COLUMN, DataType::Date32, false),
    ];
    for name in feature_names {
        fields.push(Field::new(name, DataType::Float64, false));
    }
    Schema::new(fields)
}

/// Portfolio return series schema
pub fn return_schema() -> Schema {
    Schema::new(vec![
        Field::new(DATE_COLUMN, DataType::Date32, false),
        Field::new(RETURN_COLUMN, DataType::Float64, false),
    ])
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a T> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("Missing column {}", name))?;
    if array.null_count() > 0 {
        bail!("Column {} contains {} nulls", name, array.null_count());
    }
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("Invalid {} column type {}", name, array.data_type()))
}

fn write_batch(path: &Path, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
    let batch = RecordBatch::try_new(schema, columns)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Reader for panel Parquet files
pub struct ParquetReader {
    path: PathBuf,
}

impl ParquetReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn builder(&self) -> anyhow::Result<ParquetRecordBatchReaderBuilder<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        Ok(ParquetRecordBatchReaderBuilder::try_new(file)?)
    }

    /// Read a price panel `(entity_id, date, ret)`
    pub fn read_prices(&self) -> anyhow::Result<Vec<PriceEntry>> {
        let reader = self.builder()?.build()?;
        let mut rows = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;
            let entities = column::<StringArray>(&batch, ENTITY_COLUMN)?;
            let dates = column::<Date32Array>(&batch, DATE_COLUMN)?;
            let returns = column::<Float64Array>(&batch, RETURN_COLUMN)?;

            for i in 0..batch.num_rows() {
                rows.push(PriceEntry {
                    entity_id: entities.value(i).to_string(),
                    date: date_at(dates, i)?,
                    ret: returns.value(i),
                });
            }
        }

        tracing::debug!(path = ?self.path, count = rows.len(), "Read price panel");
        Ok(rows)
    }

    /// Read a ratio panel; every column besides `entity_id` and `date` is a feature
    pub fn read_ratios(&self) -> anyhow::Result<(Vec<RatioEntry>, Vec<String>)> {
        let builder = self.builder()?;
        let feature_names: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name())
            .filter(|name| *name != ENTITY_COLUMN && *name != DATE_COLUMN)
            .cloned()
            .collect();

        let reader = builder.build()?;
        let mut rows = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;
            let entities = column::<StringArray>(&batch, ENTITY_COLUMN)?;
            let dates = column::<Date32Array>(&batch, DATE_COLUMN)?;
            let features = feature_names
                .iter()
                .map(|name| column::<Float64Array>(&batch, name))
                .collect::<anyhow::Result<Vec<_>>>()?;

            for i in 0..batch.num_rows() {
                rows.push(RatioEntry {
                    entity_id: entities.value(i).to_string(),
                    date: date_at(dates, i)?,
                    features: features.iter().map(|f| f.value(i)).collect(),
                });
            }
        }

        tracing::debug!(
            path = ?self.path,
            count = rows.len(),
            features = feature_names.len(),
            "Read ratio panel"
        );
        Ok((rows, feature_names))
    }

    /// Read a `(date, ret)` series
    pub fn read_returns(&self) -> anyhow::Result<ReturnSeries> {
        let reader = self.builder()?.build()?;
        let mut points = Vec::new();

        for batch_result in reader {
            let batch = batch_result?;
            let dates = column::<Date32Array>(&batch, DATE_COLUMN)?;
            let returns = column::<Float64Array>(&batch, RETURN_COLUMN)?;
            for i in 0..batch.num_rows() {
                points.push((date_at(dates, i)?, returns.value(i)));
            }
        }

        Ok(ReturnSeries::new(points))
    }
}

/// Writer for panels and run outputs under one directory
pub struct ParquetWriter {
    output_dir: PathBuf,
}

impl ParquetWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// `<output_dir>/<prefix>_<run>.<ext>`
    pub fn file_path(&self, prefix: &str, run: &str, ext: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.{}", prefix, run, ext))
    }

    /// Write a price panel
    pub fn write_prices(&self, path: &Path, rows: &[PriceEntry]) -> anyhow::Result<()> {
        let entities: Vec<&str> = rows.iter().map(|r| r.entity_id.as_str()).collect();
        let dates: Vec<i32> = rows.iter().map(|r| Date32Type::from_naive_date(r.date)).collect();
        let returns: Vec<f64> = rows.iter().map(|r| r.ret).collect();

        write_batch(
            path,
            Arc::new(price_schema()),
            vec![
                Arc::new(StringArray::from(entities)) as ArrayRef,
                Arc::new(Date32Array::from(dates)) as ArrayRef,
                Arc::new(Float64Array::from(returns)) as ArrayRef,
            ],
        )?;

        tracing::debug!(path = ?path, count = rows.len(), "Wrote price panel to Parquet");
        Ok(())
    }

    /// Write a ratio panel with the given feature columns
    pub fn write_ratios(
        &self,
        path: &Path,
        feature_names: &[String],
        rows: &[RatioEntry],
    ) -> anyhow::Result<()> {
        if let Some(bad) = rows.iter().find(|r| r.features.len() != feature_names.len()) {
            bail!(
                "Ratio row for {} on {} has {} features, expected {}",
                bad.entity_id,
                bad.date,
                bad.features.len(),
                feature_names.len()
            );
        }

        let entities: Vec<&str> = rows.iter().map(|r| r.entity_id.as_str()).collect();
        let dates: Vec<i32> = rows.iter().map(|r| Date32Type::from_naive_date(r.date)).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(entities)),
            Arc::new(Date32Array::from(dates)),
        ];
        for i in 0..feature_names.len() {
            let values: Vec<f64> = rows.iter().map(|r| r.features[i]).collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        write_batch(path, Arc::new(ratio_schema(feature_names)), columns)?;

        tracing::debug!(path = ?path, count = rows.len(), "Wrote ratio panel to Parquet");
        Ok(())
    }

    /// Write a portfolio return series
    pub fn write_returns(&self, path: &Path, series: &ReturnSeries) -> anyhow::Result<()> {
        let dates: Vec<i32> = series.dates().map(Date32Type::from_naive_date).collect();

        write_batch(
            path,
            Arc::new(return_schema()),
            vec![
                Arc::new(Date32Array::from(dates)) as ArrayRef,
                Arc::new(Float64Array::from(series.values())) as ArrayRef,
            ],
        )?;

        tracing::debug!(path = ?path, count = series.len(), "Wrote return series to Parquet");
        Ok(())
    }
}
