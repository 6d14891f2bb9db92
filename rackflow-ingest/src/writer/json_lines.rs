//! Newline-delimited JSON record sink
//!
//! Each finished record becomes one line:
//! `{"name": "...", "fields": {"Asset (ID)": "...", ...}}`.
//! Single-choice fields are checked against an optional option catalog;
//! a field with no catalog entry accepts any option.

use super::{EnumSelection, RecordWriter, WriteError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Serialize)]
struct RecordLine<'a> {
    name: &'a str,
    fields: &'a Map<String, Value>,
}

#[derive(Debug)]
struct OpenRecord {
    name: String,
    fields: Map<String, Value>,
}

/// Record writer emitting one JSON object per record
pub struct JsonLinesWriter<W: Write + Send> {
    out: W,
    options: BTreeMap<String, Vec<String>>,
    current: Option<OpenRecord>,
    written: usize,
}

impl<W: Write + Send> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            options: BTreeMap::new(),
            current: None,
            written: 0,
        }
    }

    /// Restrict single-choice fields to the listed option labels
    pub fn with_options(mut self, options: BTreeMap<String, Vec<String>>) -> Self {
        self.options = options;
        self
    }

    /// Records committed so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn open_record(&mut self) -> Result<&mut OpenRecord, WriteError> {
        self.current.as_mut().ok_or(WriteError::NoOpenRecord)
    }
}

#[async_trait]
impl<W: Write + Send> RecordWriter for JsonLinesWriter<W> {
    async fn prepare(&mut self) -> Result<(), WriteError> {
        if let Some(abandoned) = self.current.take() {
            tracing::debug!(name = %abandoned.name, "Discarding unfinished record");
        }
        Ok(())
    }

    async fn create_record(&mut self, name: &str) -> Result<(), WriteError> {
        self.current = Some(OpenRecord {
            name: name.to_string(),
            fields: Map::new(),
        });
        Ok(())
    }

    async fn set_text_field(&mut self, field: &str, value: &str) -> Result<(), WriteError> {
        self.open_record()?
            .fields
            .insert(field.to_string(), Value::String(value.to_string()));
        Ok(())
    }

    async fn set_enum_field(&mut self, field: &str, option: &str) -> Result<EnumSelection, WriteError> {
        if option.trim().is_empty() {
            return Ok(EnumSelection::Skipped);
        }

        // No catalog for the field means the offered options are unknown, so accept.
        if let Some(available) = self.options.get(field) {
            if !available.iter().any(|o| o == option) {
                return Ok(EnumSelection::NotOffered {
                    available: available.clone(),
                });
            }
        }

        self.open_record()?
            .fields
            .insert(field.to_string(), Value::String(option.to_string()));
        Ok(EnumSelection::Selected)
    }

    async fn set_date_field(&mut self, field: &str, month_day_year: &str) -> Result<(), WriteError> {
        NaiveDate::parse_from_str(month_day_year, "%m/%d/%Y").map_err(|_| WriteError::InvalidValue {
            field: field.to_string(),
            value: month_day_year.to_string(),
        })?;

        self.open_record()?
            .fields
            .insert(field.to_string(), Value::String(month_day_year.to_string()));
        Ok(())
    }

    async fn finish_record(&mut self) -> Result<(), WriteError> {
        let record = self.current.take().ok_or(WriteError::NoOpenRecord)?;

        let line = serde_json::to_string(&RecordLine {
            name: &record.name,
            fields: &record.fields,
        })?;
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;

        self.written += 1;
        Ok(())
    }
}
