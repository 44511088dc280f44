//! Report
//!
//! Text report of a [`Packing`]: one table row per packed item grouped by bin, the
//! totals, and a layout of each bin ordered by packed value.

use std::io;

use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{bins::Bin, packing::Packing, problem::Instance};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Printable summary of a solve.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    instance: Instance<'a>,
    packing: &'a Packing,
}

impl<'a> Report<'a> {
    /// Create a report for a packing of `instance`.
    pub fn new(instance: Instance<'a>, packing: &'a Packing) -> Self {
        Self { instance, packing }
    }

    /// Writes the report.
    ///
    /// Outcomes without an assignment print their explanation instead of a table.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        let status = self.packing.status();

        if !status.has_assignment() {
            writeln!(out, "{}", status.message())?;

            if let Some(detail) = self.packing.detail() {
                writeln!(out, "Solver said: {detail}")?;
            }

            writeln!(
                out,
                "Number of decision variables: {}",
                self.packing.variable_count()
            )?;

            return Ok(());
        }

        writeln!(out, "{}", status.message())?;

        self.write_table(&mut out)?;
        self.write_summary(&mut out)?;
        self.write_layout(&mut out)?;

        Ok(())
    }

    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let mut builder = Builder::default();
        let mut bin_boundary_rows: SmallVec<[usize; 16]> = smallvec![];
        let mut current_row = 1; // header is row 0

        builder.push_record(["Bin", "Item", "Weight", "Value"]);

        for load in self.packing.bins() {
            bin_boundary_rows.push(current_row);

            let bin_label = format!("#{:<3} (capacity {})", load.bin_idx(), load.capacity());

            if load.items().is_empty() {
                builder.push_record([
                    bin_label.clone(),
                    String::from("(empty)"),
                    String::new(),
                    String::new(),
                ]);
                current_row += 1;
            }

            for (position, packed) in load.items().iter().enumerate() {
                let label = if position == 0 {
                    bin_label.clone()
                } else {
                    String::new()
                };

                builder.push_record([
                    label,
                    format!("#{:<3}", packed.item_idx),
                    packed.weight.to_string(),
                    packed.value.to_string(),
                ]);

                current_row += 1;
            }

            builder.push_record([
                String::new(),
                String::from("Packed"),
                format!("{}/{}", load.weight(), load.capacity()),
                load.value().to_string(),
            ]);

            current_row += 1;
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        for &row in &bin_boundary_rows {
            if row > 1 {
                theme.insert_horizontal_line(row, separator);
            }
        }

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..4), Alignment::right());

        writeln!(out, "\n{table}")?;

        Ok(())
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        let capacity: u64 = self
            .instance
            .bins()
            .iter()
            .map(Bin::capacity)
            .fold(0, u64::saturating_add);

        writeln!(out)?;
        writeln!(out, " Items:       {}", self.instance.item_count())?;
        writeln!(out, " Bins:        {}", self.instance.bin_count())?;
        writeln!(
            out,
            " Weight:      {}/{capacity}",
            self.packing.total_weight()
        )?;
        writeln!(out, " \x1b[1mValue:       {}\x1b[0m", self.packing.total_value())?;

        if !self.packing.unassigned_items().is_empty() {
            let unassigned: Vec<String> = self
                .packing
                .unassigned_items()
                .iter()
                .map(|item_idx| format!("#{item_idx}"))
                .collect();

            writeln!(out, " Unassigned:  {}", unassigned.join(", "))?;
        }

        writeln!(
            out,
            " Number of decision variables: {}",
            self.packing.variable_count()
        )?;

        Ok(())
    }

    fn write_layout(&self, out: &mut impl io::Write) -> Result<(), ReportError> {
        writeln!(out, "\nLayout (ascending packed value):")?;

        for layout in self.packing.layout() {
            let mut line = format!(
                " bin #{} value {:>4} |",
                layout.bin_idx, layout.value
            );

            for segment in &layout.segments {
                line.push_str(&format!(
                    " #{} [{}..{}) |",
                    segment.item_idx,
                    segment.offset,
                    segment.offset.saturating_add(segment.weight)
                ));
            }

            if layout.unused > 0 {
                line.push_str(&format!(" free {} |", layout.unused));
            }

            writeln!(out, "{line}")?;
        }

        Ok(())
    }
}
