//! Plain-text descriptions of a series.

use riverdata_core::{
    format_date, format_time, format_value, MeasureId, MeasureLabels, RiverDataResult, Series,
};

/// Labels for `measure_id`, falling back to the raw id for ids that do not
/// follow the usual six-part layout.
pub fn labels_for(measure_id: &str) -> MeasureLabels {
    match MeasureId::parse(measure_id) {
        Ok(id) => id.translated(),
        Err(_) => MeasureLabels {
            station: measure_id.to_string(),
            parameter: "measure".to_string(),
            unit: String::new(),
        },
    }
}

/// "The most recent flow reading for station 3400TH was 43 m³/s at 09:00 UTC
/// on Saturday 13 May 2023."
pub fn latest_sentence(labels: &MeasureLabels, series: &Series) -> RiverDataResult<String> {
    let Some(latest) = series.latest() else {
        return Ok(format!(
            "There are no recent {} readings for station {}.",
            labels.parameter, labels.station
        ));
    };
    Ok(format!(
        "The most recent {} reading for station {} was {} at {} on {}.",
        labels.parameter,
        labels.station,
        with_unit(&format_value(latest.value), &labels.unit),
        format_time(latest.timestamp)?,
        format_date(latest.timestamp)?,
    ))
}

/// Count and bounds of the readings, or `None` for an empty series.
pub fn range_sentence(labels: &MeasureLabels, series: &Series) -> RiverDataResult<Option<String>> {
    let limits = match series.limits() {
        Ok(limits) => limits,
        Err(_) => return Ok(None),
    };
    Ok(Some(format!(
        "{} readings from {} on {} ranging from {} to {}.",
        series.len(),
        format_time(limits.min_time)?,
        format_date(limits.min_time)?,
        format_value(limits.min_value),
        with_unit(&format_value(limits.max_value), &labels.unit),
    )))
}

/// Full description of a measure's series.
pub fn describe(measure_id: &str, series: &Series) -> RiverDataResult<String> {
    let labels = labels_for(measure_id);
    let mut text = latest_sentence(&labels, series)?;
    if let Some(range) = range_sentence(&labels, series)? {
        text.push('\n');
        text.push_str(&range);
    }
    Ok(text)
}

fn with_unit(value: &str, unit: &str) -> String {
    if unit.is_empty() {
        value.to_string()
    } else {
        format!("{value} {unit}")
    }
}
