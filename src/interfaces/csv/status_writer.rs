use crate::domain::status::StatusDefinition;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct StatusRow<'a> {
    id: &'a str,
    label: &'a str,
    parent: &'a str,
}

/// Writes status definitions as `id,label,parent` CSV rows.
pub struct StatusWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatusWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_statuses<'a>(
        &mut self,
        statuses: impl IntoIterator<Item = &'a StatusDefinition>,
    ) -> Result<()> {
        let mut wrote_any = false;
        for status in statuses {
            self.writer.serialize(StatusRow {
                id: status.id.as_str(),
                label: &status.label,
                parent: status.parent.as_ref().map(|parent| parent.as_str()).unwrap_or_default(),
            })?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer.write_record(["id", "label", "parent"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
