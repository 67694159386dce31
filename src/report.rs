use anyhow::Result;
use prettytable::{Cell, Row as PrettyRow, Table};
use std::io::Write;

use crate::pipeline::DedupReport;

/// Consumes the produced groups and metrics for display. Charts, dashboards
/// and anything interactive belong to implementations behind this seam.
pub trait ReportSink {
    fn report(&mut self, report: &DedupReport) -> Result<()>;
}

/// Renders multi-member groups as text tables plus a metric summary,
/// mirroring the columns a reviewer needs to eyeball a match: company name,
/// website, phone.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn report(&mut self, report: &DedupReport) -> Result<()> {
        let mut shown = 0usize;
        for group in report.groups.iter().filter(|g| g.len() > 1) {
            shown += 1;
            writeln!(self.out, "\nGroup {} ({} duplicates):", shown, group.len())?;

            let mut table = Table::new();
            table.add_row(PrettyRow::new(vec![
                Cell::new("ID"),
                Cell::new("Company Name"),
                Cell::new("Website"),
                Cell::new("Phone"),
            ]));
            for member in &group.members {
                table.add_row(PrettyRow::new(vec![
                    Cell::new(&member.id().to_string()),
                    Cell::new(member.raw.company_name.as_deref().unwrap_or("")),
                    Cell::new(member.raw.website_domain.as_deref().unwrap_or("")),
                    Cell::new(member.raw.primary_phone.as_deref().unwrap_or("")),
                ]));
            }
            table.print(&mut self.out)?;
        }

        if shown == 0 {
            writeln!(self.out, "No duplicate groups with more than one member.")?;
        }

        writeln!(
            self.out,
            "\nInternal evaluation over {} records:",
            report.total_records
        )?;
        writeln!(
            self.out,
            "  Mean name similarity within groups: {:.2}%",
            report.metrics.avg_name_similarity
        )?;
        writeln!(
            self.out,
            "  Duplicate coverage: {:.2}%",
            report.metrics.coverage_pct
        )?;
        writeln!(
            self.out,
            "  Key-consistency error: {:.4}",
            report.metrics.key_consistency_error
        )?;

        Ok(())
    }
}

/// Serializes the whole report as JSON for downstream tooling.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        JsonSink { out }
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn report(&mut self, report: &DedupReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)?;
        Ok(())
    }
}
