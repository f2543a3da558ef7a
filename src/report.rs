//! Dry-run listing of a loaded series.

use crate::metadata::SeriesSummary;
use crate::series_loader::SeriesCollection;

use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceEntry {
    pub key: f64,
    pub slice_location: f64,
    pub slice_thickness: Option<f64>,
    pub source: String,
}

/// What a dry run prints instead of writing a volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub summary: Option<SeriesSummary>,
    pub key_collisions: usize,
    /// Slices by descending ordering key.
    pub slices: Vec<SliceEntry>,
}

impl SeriesReport {
    pub fn new(series: &SeriesCollection, parse_json: bool) -> Self {
        let summary = series.iter().next().map(|(_, slice)| {
            SeriesSummary::from_object(slice.object(), series.len(), parse_json)
        });
        let slices = series
            .iter()
            .rev()
            .map(|(key, slice)| SliceEntry {
                key: key.value(),
                slice_location: slice.slice_location,
                slice_thickness: slice.slice_thickness,
                source: slice.source_name(),
            })
            .collect();

        Self {
            summary,
            key_collisions: series.collisions(),
            slices,
        }
    }

    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "*** DRY RUN ***")?;
        if let Some(summary) = &self.summary {
            let identity = &summary.identity;
            writeln!(out, "Patient ID:          {}", identity.patient_id)?;
            writeln!(out, "Patient name:        {}", summary.patient_name)?;
            writeln!(out, "Study UID:           {}", identity.study_instance_uid)?;
            writeln!(out, "Series UID:          {}", identity.series_instance_uid)?;
            writeln!(out, "Study:               {} {}", summary.study_id, summary.study_description)?;
            writeln!(out, "Series:              {}", summary.series_description)?;
            writeln!(out, "Manufacturer:        {} {}", summary.manufacturer, summary.manufacturer_model_name)?;
            writeln!(out, "Pixel spacing:       {}", summary.pixel_spacing.join(" x "))?;
            writeln!(out, "Slice thickness:     {}", summary.slice_thickness)?;
            writeln!(out, "Number of slices:    {}", summary.number_of_slices)?;
            if let Some(json) = &summary.embedded_json {
                writeln!(out, "Embedded JSON:       {json}")?;
            }
        }
        if self.key_collisions > 0 {
            writeln!(out, "Key collisions:      {} (slices were dropped)", self.key_collisions)?;
        }

        writeln!(out, "Slices:")?;
        writeln!(out, "\tZ-Location\tSliceLocation\tSliceThickness")?;
        for entry in &self.slices {
            let thickness = entry
                .slice_thickness
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(out, "\t{}\t{}\t{}", entry.key, entry.slice_location, thickness)?;
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: W) -> io::Result<()> {
        serde_json::to_writer_pretty(out, self).map_err(io::Error::from)
    }
}
