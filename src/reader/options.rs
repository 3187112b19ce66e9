use parquet::arrow::arrow_reader::ArrowReaderBuilder;

/// Options for reading GeoParquet
#[derive(Clone, Debug, Default)]
pub struct GeoParquetReaderOptions {
    /// The number of rows in each batch. If not provided, the upstream [parquet] default is 1024.
    batch_size: Option<usize>,
}

impl GeoParquetReaderOptions {
    /// Set the size of the [RecordBatch][arrow_array::RecordBatch]es decoded from the file
    /// before they are assembled into a single frame.
    ///
    /// Defaults to 1024. If the batch_size more than the file row count, use the file row count.
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size),
        }
    }

    /// Apply these settings to an [ArrowReaderBuilder]
    pub(crate) fn apply_to_builder<T>(
        self,
        builder: ArrowReaderBuilder<T>,
    ) -> ArrowReaderBuilder<T> {
        if let Some(batch_size) = self.batch_size {
            builder.with_batch_size(batch_size)
        } else {
            builder
        }
    }
}
