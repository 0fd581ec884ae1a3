//! Report rendering

use std::io::{self, Write};

use serde::Serialize;

use super::{RepairReport, ReportFormat, ScanReport};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Tagged<'a> {
    Scan(&'a ScanReport),
    Repair(&'a RepairReport),
}

/// Writes reports in one format to one destination.
pub struct ReportEmitter<W: Write> {
    format: ReportFormat,
    out: W,
}

impl<W: Write> ReportEmitter<W> {
    pub fn new(format: ReportFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Consumes the emitter, returning the destination.
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit_scan(&mut self, report: &ScanReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => self.write_json(&Tagged::Scan(report)),
            ReportFormat::Text => self.write_scan_text(report),
        }
    }

    pub fn emit_repair(&mut self, report: &RepairReport) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => self.write_json(&Tagged::Repair(report)),
            ReportFormat::Text => self.write_repair_text(report),
        }
    }

    fn write_json(&mut self, tagged: &Tagged<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, tagged)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn write_scan_text(&mut self, report: &ScanReport) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "scan {}", report.scan_id)?;
        writeln!(out, "  store: {}", report.store)?;
        writeln!(out, "  bucket: {}", report.bucket)?;
        writeln!(out, "  generated: {}", report.generated_at.to_rfc3339())?;
        writeln!(out, "  healthy: {}", report.healthy_count)?;
        writeln!(out, "  corrupt: {}", report.corrupt_count)?;
        writeln!(out, "  total: {}", report.total_count)?;
        if !report.quarantined.is_empty() {
            writeln!(out, "  quarantined:")?;
            for record in &report.quarantined {
                writeln!(
                    out,
                    "    {} -> {} ({} bytes, crc32 {:08x})",
                    record.key_hex,
                    record.path.display(),
                    record.byte_len,
                    record.crc32
                )?;
            }
        }
        out.flush()
    }

    fn write_repair_text(&mut self, report: &RepairReport) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "repair {}", report.scan_id)?;
        writeln!(out, "  store: {}", report.store)?;
        writeln!(out, "  bucket: {}", report.bucket)?;
        writeln!(out, "  generated: {}", report.generated_at.to_rfc3339())?;
        writeln!(out, "  deleted: {}", report.deleted)?;
        writeln!(out, "  already absent: {}", report.already_absent)?;
        writeln!(out, "  remaining healthy: {}", report.remaining_healthy)?;
        out.flush()
    }
}
