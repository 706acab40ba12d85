//! CSV input: one row per building.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{de, Deserialize, Deserializer};

use crate::error::Result;

/// A raw input row. Columns are matched by header name; unknown columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildingRecord {
    pub id: String,
    /// Ground-truth damage class.
    #[serde(deserialize_with = "damage_class")]
    pub label: u32,
    /// Predicted damage class.
    #[serde(deserialize_with = "damage_class")]
    pub prediction_class: u32,
    /// Polygon boundary as WKT.
    pub geometry: String,
}

/// A class id written either as an integer or as an integral float (`1.0`),
/// which is how dataframe exports often store integer columns.
fn damage_class<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 || !(0.0..=u32::MAX as f64).contains(&value) {
        return Err(de::Error::custom(format!(
            "damage class must be a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

/// Read every record from a CSV source with a header row.
///
/// The first malformed row (missing column, non-integer class) fails the whole read.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<BuildingRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<BuildingRecord>() {
        records.push(row?);
    }

    Ok(records)
}

pub fn read_records_path<P: AsRef<Path>>(path: P) -> Result<Vec<BuildingRecord>> {
    let file = File::open(path.as_ref())?;
    let records = read_records(BufReader::new(file))?;
    tracing::debug!(
        path = %path.as_ref().display(),
        rows = records.len(),
        "Read building records"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FootprintError;

    const SAMPLE: &str = "\
id,label,prediction_class,geometry,score
b-1,0,0,\"POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))\",0.12
b-2,1,1,\"POLYGON ((20 0, 30 0, 30 10, 20 10, 20 0))\",0.91
";

    #[test]
    fn reads_rows_and_ignores_extra_columns() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "b-1");
        assert_eq!(records[1].label, 1);
        assert_eq!(records[1].prediction_class, 1);
        assert!(records[1].geometry.starts_with("POLYGON ((20 0"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "id,label,geometry\nb-1,0,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, FootprintError::Csv(_)));
    }

    #[test]
    fn non_integer_class_is_an_error() {
        let csv = "id,label,prediction_class,geometry\nb-1,0,maybe,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n";
        assert!(read_records(csv.as_bytes()).is_err());
    }

    #[test]
    fn integral_float_classes_are_accepted() {
        let csv = "id,label,prediction_class,geometry\nb-1,1.0,0.0,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].label, 1);
        assert_eq!(records[0].prediction_class, 0);
    }

    #[test]
    fn fractional_or_negative_classes_are_rejected() {
        for class in ["0.5", "-1", "NaN"] {
            let csv = format!(
                "id,label,prediction_class,geometry\nb-1,0,{class},\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n"
            );
            let err = read_records(csv.as_bytes()).unwrap_err();
            assert!(matches!(err, FootprintError::Csv(_)), "{class}: {err:?}");
        }
    }

    #[test]
    fn absent_file_is_an_io_error() {
        let err = read_records_path("definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, FootprintError::Io(_)));
    }
}
