//! Mapping of a [`FieldMap`] onto tracker fields

use super::{EnumSelection, RecordWriter, WriteError};
use crate::models::FieldMap;
use crate::normalize::normalize_building;
use std::time::Duration;

/// Warning code for an option the tracker does not offer
pub const OPTION_NOT_FOUND: &str = "OPTION_NOT_FOUND";

pub const FIELD_ASSET_ID: &str = "Asset (ID)";
pub const FIELD_BRICK: &str = "Brick";
pub const FIELD_VENDOR: &str = "Vendor";
pub const FIELD_UPLINKS: &str = "Uplinks";
pub const FIELD_BUILDING: &str = "Building";
pub const FIELD_RACK_TYPE: &str = "Rack Type (ID)";
pub const FIELD_RACK_TYPE_RAW: &str = "Rack Type Raw";
pub const FIELD_SLA_DATE: &str = "SLA Date (ID)";
pub const FIELD_SLA_RAW: &str = "SLA Raw";

/// Advisory condition raised while writing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWarning {
    pub code: String,
    pub message: String,
}

/// Create one tracker record from a field map.
///
/// Returns the advisory warnings raised along the way. Any writer error
/// aborts the record.
pub async fn write_field_map<W>(
    writer: &mut W,
    map: &FieldMap,
    ready_timeout: Duration,
) -> Result<Vec<RecordWarning>, WriteError>
where
    W: RecordWriter + ?Sized,
{
    let mut warnings = Vec::new();

    tracing::info!(asset_id = %map.asset_id, name = %map.rack_position, "Creating record");

    writer.create_record(&map.rack_position).await?;
    tokio::time::timeout(ready_timeout, writer.wait_until_ready())
        .await
        .map_err(|_| WriteError::Timeout(format!("record not ready after {:?}", ready_timeout)))??;

    writer.set_text_field(FIELD_ASSET_ID, map.asset_id.as_str()).await?;
    writer.set_text_field(FIELD_BRICK, &map.brick_name).await?;
    writer.set_text_field(FIELD_VENDOR, &map.vendor).await?;
    writer.set_text_field(FIELD_UPLINKS, &map.uplinks).await?;

    let building = normalize_building(&map.building);
    select_option(writer, FIELD_BUILDING, &building, &mut warnings).await?;
    select_option(writer, FIELD_RACK_TYPE, &map.rack_type_canonical, &mut warnings).await?;
    writer.set_text_field(FIELD_RACK_TYPE_RAW, &map.rack_type_raw).await?;

    if map.sla_date.month_day_year.is_empty() {
        tracing::warn!(asset_id = %map.asset_id, "No SLA date to set; skipping");
    } else {
        writer
            .set_date_field(FIELD_SLA_DATE, &map.sla_date.month_day_year)
            .await?;
    }
    writer.set_text_field(FIELD_SLA_RAW, &map.sla_date.raw()).await?;

    writer.finish_record().await?;

    tracing::info!(asset_id = %map.asset_id, warnings = warnings.len(), "Record written");
    Ok(warnings)
}

async fn select_option<W>(
    writer: &mut W,
    field: &str,
    option: &str,
    warnings: &mut Vec<RecordWarning>,
) -> Result<(), WriteError>
where
    W: RecordWriter + ?Sized,
{
    let wanted = option.split_whitespace().collect::<Vec<_>>().join(" ");
    if wanted.is_empty() {
        tracing::warn!(field = %field, "Option empty; skipping field");
        return Ok(());
    }

    match writer.set_enum_field(field, &wanted).await? {
        EnumSelection::Selected | EnumSelection::Skipped => {}
        EnumSelection::NotOffered { available } => {
            tracing::warn!(field = %field, option = %wanted, available = ?available, "Option not available; field left unset");
            warnings.push(RecordWarning {
                code: OPTION_NOT_FOUND.to_string(),
                message: format!("{} option not found: {}", field, wanted),
            });
        }
    }

    Ok(())
}
