use crate::domain::status::{StatusDefinition, StatusKind};
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct StatusRecord {
    id: String,
    label: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<StatusRecord> for StatusDefinition {
    type Error = PaymentError;

    fn try_from(record: StatusRecord) -> Result<Self> {
        if record.id.is_empty() {
            return Err(PaymentError::ValidationError(
                "Status definition without an id".to_string(),
            ));
        }
        Ok(Self {
            id: StatusKind::new(record.id),
            label: record.label,
            description: record.description.unwrap_or_default(),
            parent: record
                .parent
                .filter(|parent| !parent.is_empty())
                .map(StatusKind::new),
        })
    }
}

/// Reads status definitions from a CSV source with an
/// `id,label,parent,description` header. An empty parent marks a root.
pub struct StatusReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> StatusReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and converts status definitions, one result per row.
    pub fn statuses(self) -> impl Iterator<Item = Result<StatusDefinition>> {
        self.reader
            .into_deserialize::<StatusRecord>()
            .map(|result| result.map_err(PaymentError::from).and_then(StatusDefinition::try_from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "id, label, parent, description\n\
                    payment_on_hold, On hold, payment_pending, Waiting for review\n\
                    payment_disputed, Disputed, ,";
        let results: Vec<Result<StatusDefinition>> =
            StatusReader::new(data.as_bytes()).statuses().collect();

        assert_eq!(results.len(), 2);
        let on_hold = results[0].as_ref().unwrap();
        assert_eq!(on_hold.parent, Some(StatusKind::new("payment_pending")));
        assert_eq!(on_hold.description, "Waiting for review");
        assert!(results[1].as_ref().unwrap().is_root());
    }

    #[test]
    fn test_description_column_is_optional() {
        let data = "id,label,parent\npayment_on_hold,On hold,payment_pending";
        let results: Vec<Result<StatusDefinition>> =
            StatusReader::new(data.as_bytes()).statuses().collect();
        assert_eq!(results[0].as_ref().unwrap().description, "");
    }

    #[test]
    fn test_reader_rejects_missing_id() {
        let data = "id,label,parent\n,Nameless,";
        let results: Vec<Result<StatusDefinition>> =
            StatusReader::new(data.as_bytes()).statuses().collect();
        assert!(matches!(results[0], Err(PaymentError::ValidationError(_))));
    }
}
