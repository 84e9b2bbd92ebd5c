//! Persisted panel layout
//!
//! A layout is a list of records separated by `|`, each record eleven
//! comma-separated fields:
//!
//! ```text
//! kind,fixed,y_offset,attach_angle,px,py,pz,rx,ry,rz,rw
//! ```
//!
//! Records are keyed by panel kind. A malformed record is skipped on its own;
//! the rest of the layout still loads.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3, Vec4};
use serde::Serialize;

use crate::panel::{Panel, PanelKind, UnknownKind};

const FIELD_COUNT: usize = 11;
const RECORD_SEPARATOR: u8 = b'|';

/// One panel's saved placement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRecord {
    pub kind: PanelKind,
    pub fixed: bool,
    pub y_offset: f32,
    pub attach_angle: f32,
    pub position: Vec3,
    pub rotation: Quat,
}

impl LayoutRecord {
    /// Capture `panel` as it would be persisted
    pub fn from_panel(panel: &Panel) -> Self {
        Self {
            kind: panel.kind,
            fixed: panel.fixed,
            y_offset: panel.offset.stable,
            attach_angle: panel.attach_angle,
            position: panel.pose.position,
            rotation: panel.pose.rotation,
        }
    }

    fn fields(&self) -> [String; FIELD_COUNT] {
        [
            self.kind.as_str().to_string(),
            self.fixed.to_string(),
            self.y_offset.to_string(),
            self.attach_angle.to_string(),
            self.position.x.to_string(),
            self.position.y.to_string(),
            self.position.z.to_string(),
            self.rotation.x.to_string(),
            self.rotation.y.to_string(),
            self.rotation.z.to_string(),
            self.rotation.w.to_string(),
        ]
    }
}

/// Why a single record could not be read
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),
    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),
    #[error("invalid bool '{0}'")]
    InvalidBool(String),
    #[error("invalid number '{value}' for {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("rotation {0} has no length")]
    DegenerateRotation(Vec4),
    #[error("unreadable record: {0}")]
    Csv(#[from] csv::Error),
}

/// Why the layout store could not be read or written
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("layout file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("layout encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("layout is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

fn parse_bool(value: &str) -> Result<bool, RecordError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(RecordError::InvalidBool(value.to_string()))
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f32, RecordError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Parse one record
pub fn parse_record(record: &csv::StringRecord) -> Result<LayoutRecord, RecordError> {
    if record.len() != FIELD_COUNT {
        return Err(RecordError::FieldCount(record.len()));
    }

    let number = |index: usize, name: &'static str| parse_number(name, &record[index]);

    let raw = Vec4::new(
        number(7, "rx")?,
        number(8, "ry")?,
        number(9, "rz")?,
        number(10, "rw")?,
    );
    let rotation = raw.try_normalize().ok_or(RecordError::DegenerateRotation(raw))?;

    Ok(LayoutRecord {
        kind: record[0].parse()?,
        fixed: parse_bool(&record[1])?,
        y_offset: number(2, "y_offset")?,
        attach_angle: number(3, "attach_angle")?,
        position: Vec3::new(number(4, "px")?, number(5, "py")?, number(6, "pz")?),
        rotation: Quat::from_vec4(rotation),
    })
}

/// Parse a layout, skipping malformed records with a warning
pub fn parse_layout(text: &str) -> Vec<LayoutRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .terminator(csv::Terminator::Any(RECORD_SEPARATOR))
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let parsed = result.map_err(RecordError::from).and_then(|record| {
            if record.iter().all(str::is_empty) {
                return Ok(None);
            }
            parse_record(&record).map(Some)
        });

        match parsed {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(err) => tracing::warn!(record = index, %err, "skipping malformed layout record"),
        }
    }
    records
}

/// Encode records in the persisted layout format
pub fn encode_layout(records: &[LayoutRecord]) -> Result<String, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(RECORD_SEPARATOR))
        .from_writer(Vec::new());

    for record in records {
        writer.write_record(record.fields())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))?;
    let text = String::from_utf8(bytes)?;
    Ok(text
        .trim_end_matches(RECORD_SEPARATOR as char)
        .to_string())
}

/// Records for every panel whose placement is worth keeping
///
/// Only advanced, non-unique, visible panels that are core or docked.
pub fn snapshot(panels: &[Panel]) -> Vec<LayoutRecord> {
    panels
        .iter()
        .filter(|p| p.advanced && !p.is_unique() && p.visible && (p.kind.is_core() || p.fixed))
        .map(LayoutRecord::from_panel)
        .collect()
}

/// Backing store for the persisted layout
pub trait LayoutStorage {
    /// Saved records; empty when nothing was saved
    fn load(&self) -> Result<Vec<LayoutRecord>, StorageError>;
    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StorageError>;
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Load records, treating any storage failure as an empty layout
pub fn load_records(storage: &dyn LayoutStorage) -> Vec<LayoutRecord> {
    match storage.load() {
        Ok(records) => {
            tracing::debug!(count = records.len(), "loaded panel layout");
            records
        }
        Err(err) => {
            tracing::warn!(%err, "failed to load panel layout, using defaults");
            Vec::new()
        }
    }
}

/// Layout stored in a single file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the config directory
    pub fn default_location() -> Option<Self> {
        crate::config_paths::layout_file().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutStorage for FileStorage {
    fn load(&self) -> Result<Vec<LayoutRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        Ok(parse_layout(&text))
    }

    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode_layout(records)?)?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "saved panel layout");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory layout, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    text: Option<String>,
}

impl MemoryStorage {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl LayoutStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<LayoutRecord>, StorageError> {
        Ok(self.text.as_deref().map(parse_layout).unwrap_or_default())
    }

    fn save(&mut self, records: &[LayoutRecord]) -> Result<(), StorageError> {
        self.text = Some(encode_layout(records)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.text = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: PanelKind, fixed: bool, y_offset: f32, attach_angle: f32) -> LayoutRecord {
        LayoutRecord {
            kind,
            fixed,
            y_offset,
            attach_angle,
            position: Vec3::new(0.5, 1.25, -2.0),
            rotation: Quat::IDENTITY,
        }
    }

    #[test]
    fn test_encode_format() {
        let text = encode_layout(&[
            record(PanelKind::Color, true, 0.2, 120.0),
            record(PanelKind::Lights, false, 0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(
            text,
            "Color,true,0.2,120,0.5,1.25,-2,0,0,0,1|Lights,false,0,0,0.5,1.25,-2,0,0,0,1"
        );
    }

    #[test]
    fn test_parse_tolerates_case_and_whitespace() {
        let records = parse_layout("Labs, TRUE ,-0.35,240,0,0,0,0,0,0,1|\n");
        assert_eq!(records, vec![{
            let mut r = record(PanelKind::Labs, true, -0.35, 240.0);
            r.position = Vec3::ZERO;
            r
        }]);
    }

    #[test]
    fn test_malformed_records_skipped_individually() {
        let text = [
            "Color,true,0.2,120,0,0,0,0,0,0,1",
            "Toaster,true,0,0,0,0,0,0,0,0,1",
            "Brush,maybe,0,0,0,0,0,0,0,0,1",
            "Extra,true,high,0,0,0,0,0,0,0,1",
            "Labs,true,0,0",
            "Lights,false,0,0,1,1,1,0,0,0,0",
            "Brush,false,0.1,240,0,0,0,0,0,0,1",
        ]
        .join("|");
        let kinds: Vec<PanelKind> = parse_layout(&text).iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![PanelKind::Color, PanelKind::Brush]);
    }

    #[test]
    fn test_parse_record_errors() {
        let bad = csv::StringRecord::from(vec!["Color", "yes"]);
        assert!(matches!(parse_record(&bad), Err(RecordError::FieldCount(2))));

        let fields = ["Color", "yes", "0", "0", "0", "0", "0", "0", "0", "0", "1"];
        let bad = csv::StringRecord::from(fields.to_vec());
        assert!(matches!(parse_record(&bad), Err(RecordError::InvalidBool(_))));

        let fields = ["Color", "true", "NaN", "0", "0", "0", "0", "0", "0", "0", "1"];
        let bad = csv::StringRecord::from(fields.to_vec());
        assert!(matches!(
            parse_record(&bad),
            Err(RecordError::InvalidNumber {
                field: "y_offset",
                ..
            })
        ));

        let fields = ["Lights", "false", "0", "0", "1", "1", "1", "0", "0", "0", "0"];
        let bad = csv::StringRecord::from(fields.to_vec());
        assert!(matches!(
            parse_record(&bad),
            Err(RecordError::DegenerateRotation(_))
        ));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("nested").join("panels.layout"));
        assert!(storage.load().unwrap().is_empty());

        let records = vec![
            record(PanelKind::ToolsAdvanced, true, 0.25, 0.0),
            record(PanelKind::Reference, false, 0.0, 120.0),
        ];
        storage.save(&records).unwrap();
        assert_eq!(storage.load().unwrap(), records);

        storage.clear().unwrap();
        assert!(!storage.path().exists());
        assert!(load_records(&storage).is_empty());
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::default();
        storage
            .save(&[record(PanelKind::Extra, true, -0.2, 0.0)])
            .unwrap();
        assert!(storage.text().unwrap().starts_with("Extra,true,-0.2,0,"));
        assert_eq!(storage.load().unwrap().len(), 1);
        storage.clear().unwrap();
        assert!(storage.text().is_none());
    }
}
