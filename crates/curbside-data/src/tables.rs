use std::{
    env, fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use once_cell::sync::OnceCell;
use polars::prelude::*;
use tracing::{debug, info, instrument};

use crate::{
    DATASET_FORMAT_ENV, DATASET_URI_ENV,
    error::{DataError, Result},
    schema::{BLOCKS_SCHEMA, INTERSECTIONS_SCHEMA},
};

/// On-disk encoding of the table files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetFormat {
    #[default]
    Parquet,
    Csv,
}

impl DatasetFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for DatasetFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parquet" | "" => Ok(Self::Parquet),
            "csv" => Ok(Self::Csv),
            other => Err(DataError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// The two reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Blocks,
    Intersections,
}

impl Table {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Intersections => "intersections",
        }
    }

    #[must_use]
    pub fn schema(self) -> &'static [(PlSmallStr, DataType)] {
        match self {
            Self::Blocks => &BLOCKS_SCHEMA,
            Self::Intersections => &INTERSECTIONS_SCHEMA,
        }
    }

    #[must_use]
    pub fn file_name(self, format: DatasetFormat) -> String {
        format!("{}.{}", self.name(), format.extension())
    }
}

/// Where the tables come from.
#[derive(Clone)]
pub enum DatasetSource {
    /// A directory holding `blocks.<ext>` and `intersections.<ext>`.
    Directory { path: PathBuf, format: DatasetFormat },
    /// Tables already in memory.
    Frames {
        blocks: DataFrame,
        intersections: DataFrame,
    },
}

impl fmt::Debug for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory { path, format } => f
                .debug_struct("Directory")
                .field("path", path)
                .field("format", format)
                .finish(),
            Self::Frames {
                blocks,
                intersections,
            } => f
                .debug_struct("Frames")
                .field("blocks_rows", &blocks.height())
                .field("intersections_rows", &intersections.height())
                .finish(),
        }
    }
}

impl DatasetSource {
    pub fn directory(path: impl Into<PathBuf>, format: DatasetFormat) -> Self {
        Self::Directory {
            path: path.into(),
            format,
        }
    }

    /// Read the dataset location from `CURBSIDE_DATASET_URI` and
    /// `CURBSIDE_DATASET_FORMAT`.
    ///
    /// A missing location is a configuration error, there is no default.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var(DATASET_URI_ENV).ok(),
            env::var(DATASET_FORMAT_ENV).ok(),
        )
    }

    pub fn from_vars(uri: Option<String>, format: Option<String>) -> Result<Self> {
        let uri = uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(DataError::MissingDatasetUri)?;
        let format = format
            .as_deref()
            .map(DatasetFormat::from_str)
            .transpose()?
            .unwrap_or_default();
        Ok(Self::directory(uri.trim(), format))
    }

    fn read_table(&self, table: Table) -> Result<DataFrame> {
        match self {
            Self::Directory { path, format } => read_table_file(path, table, *format),
            Self::Frames {
                blocks,
                intersections,
            } => Ok(match table {
                Table::Blocks => blocks.clone(),
                Table::Intersections => intersections.clone(),
            }),
        }
    }
}

fn read_table_file(dir: &Path, table: Table, format: DatasetFormat) -> Result<DataFrame> {
    let path = dir.join(table.file_name(format));
    if !path.exists() {
        return Err(DataError::DatasetNotFound(path));
    }
    let df = match format {
        DatasetFormat::Parquet => LazyFrame::scan_parquet(&path, Default::default())?.collect()?,
        // Everything is read as text first so that zip codes keep their leading zeros.
        DatasetFormat::Csv => LazyCsvReader::new(&path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?,
    };
    Ok(df)
}

fn check_columns(df: &DataFrame, table: Table) -> Result<()> {
    let missing: Vec<String> = table
        .schema()
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| df.get_column_index(name).is_none())
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingColumns {
            table: table.name(),
            columns: missing,
        })
    }
}

fn load_table(source: &DatasetSource, table: Table) -> Result<LazyFrame> {
    info!(
        table = table.name(),
        "Loading and collecting into memory for the first time..."
    );
    let t_load = std::time::Instant::now();

    let df = source.read_table(table)?;
    check_columns(&df, table)?;

    let columns: Vec<Expr> = table
        .schema()
        .iter()
        .map(|(name, dtype)| col(name.clone()).cast(dtype.clone()))
        .collect();
    let df = df.lazy().select(columns).collect()?;

    info!(
        table = table.name(),
        rows = df.height(),
        time_collected = ?t_load.elapsed(),
        "Collected into memory"
    );
    Ok(df.lazy())
}

/// Shared, read-only handle on the reference tables.
///
/// Create one at start-up and share it (usually behind an `Arc`) between
/// searchers. Each table is loaded on first access; concurrent first accesses
/// wait for a single load instead of racing. A failed load is reported to the
/// caller and attempted again on the next access.
pub struct DatasetHandle {
    source: DatasetSource,
    blocks: OnceCell<LazyFrame>,
    intersections: OnceCell<LazyFrame>,
}

impl fmt::Debug for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetHandle")
            .field("source", &self.source)
            .field("blocks_loaded", &self.blocks.get().is_some())
            .field("intersections_loaded", &self.intersections.get().is_some())
            .finish()
    }
}

impl DatasetHandle {
    #[must_use]
    pub fn new(source: DatasetSource) -> Self {
        Self {
            source,
            blocks: OnceCell::new(),
            intersections: OnceCell::new(),
        }
    }

    pub fn from_env() -> Result<Self> {
        DatasetSource::from_env().map(Self::new)
    }

    #[must_use]
    pub fn from_frames(blocks: DataFrame, intersections: DataFrame) -> Self {
        Self::new(DatasetSource::Frames {
            blocks,
            intersections,
        })
    }

    #[must_use]
    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// A per-call view of the `blocks` table.
    pub fn blocks(&self) -> Result<LazyFrame> {
        self.table(Table::Blocks)
    }

    /// A per-call view of the `intersections` table.
    pub fn intersections(&self) -> Result<LazyFrame> {
        self.table(Table::Intersections)
    }

    pub fn table(&self, table: Table) -> Result<LazyFrame> {
        let lf = self
            .cell(table)
            .get_or_try_init(|| load_table(&self.source, table))
            .cloned()?;
        debug!(table = table.name(), "Acquired table view");
        Ok(lf)
    }

    #[must_use]
    pub fn is_loaded(&self, table: Table) -> bool {
        self.cell(table).get().is_some()
    }

    /// Load both tables now rather than on the first search.
    #[instrument(name = "Warm up dataset", level = "info", skip(self))]
    pub fn warm_up(&self) -> Result<()> {
        let _ = self.blocks()?;
        let _ = self.intersections()?;
        Ok(())
    }

    const fn cell(&self, table: Table) -> &OnceCell<LazyFrame> {
        match table {
            Table::Blocks => &self.blocks,
            Table::Intersections => &self.intersections,
        }
    }
}
