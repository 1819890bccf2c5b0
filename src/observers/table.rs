//! Table observer for pretty-printing snapshots and reports.
//!
//! This module provides [`TableObserver`], which renders a [`Snapshot`] or a
//! final [`Report`] as a formatted table using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature (enabled by default).
//!
//! # Examples
//!
//! ## Standard format (vertical list)
//!
//! ```rust,ignore
//! use ordini::observers::table::{TableObserver, TableStyle};
//!
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render(&snapshot));
//! // ╭────────────────┬──────────┬─────────╮
//! // │ Counter        │ Ordering │ Value   │
//! // ├────────────────┼──────────┼─────────┤
//! // │ unsynchronized │ none     │ 1874211 │
//! // │ mutex          │ lock     │ 1402263 │
//! // │ seq_cst        │ SeqCst   │ 2291034 │
//! // ╰────────────────┴──────────┴─────────╯
//! ```
//!
//! ## Compact format (multiple columns)
//!
//! ```rust,ignore
//! let observer = TableObserver::new().compact(true).columns(3);
//! println!("{}", observer.render(&snapshot));
//! // ╭─────────────────────────┬────────────────┬──────────────────╮
//! // │ unsynchronized: 1874211 │ mutex: 1402263 │ seq_cst: 2291034 │
//! // ╰─────────────────────────┴────────────────┴──────────────────╯
//! ```

use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Remove, Style};
use tabled::{Table, Tabled};

use crate::coordinator::Report;
use crate::discipline::Discipline;
use crate::snapshot::Snapshot;

/// Border style of the rendered tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// `+`, `-` and `|` only.
    Ascii,
    /// Box drawing with rounded corners.
    #[default]
    Rounded,
    /// Box drawing with square corners.
    Sharp,
    /// Box drawing with a line between every row.
    Modern,
    /// GitHub-flavored Markdown.
    Markdown,
    /// Whitespace only.
    Blank,
}

impl TableStyle {
    fn apply(self, table: &mut Table) {
        match self {
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Blank => table.with(Style::blank()),
        };
    }
}

/// Separator inside the `name: value` cells of compact mode.
const CELL_SEPARATOR: &str = ": ";

#[derive(Debug, Clone)]
struct Layout {
    style: TableStyle,
    header: bool,
    title: Option<String>,
    // Compact mode packs `columns` counters per row, without a header.
    compact: bool,
    columns: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            header: true,
            title: None,
            compact: false,
            columns: 1,
        }
    }
}

/// Row of an intermediate snapshot.
#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Counter")]
    name: &'static str,
    #[tabled(rename = "Ordering")]
    ordering: String,
    #[tabled(rename = "Value")]
    value: u64,
}

/// Row of the final report.
#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Counter")]
    name: &'static str,
    #[tabled(rename = "Ordering")]
    ordering: String,
    #[tabled(rename = "Value")]
    value: u64,
    #[tabled(rename = "Lost")]
    lost: u64,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Label of the ordering column.
fn ordering_label(discipline: Discipline) -> String {
    match discipline {
        Discipline::Unsynchronized => "none".to_string(),
        Discipline::Mutex => "lock".to_string(),
        other => other
            .ordering()
            .map(|o| format!("{:?}", o))
            .unwrap_or_default(),
    }
}

/// An observer that renders snapshots and reports as formatted tables.
///
/// Supports two rendering modes:
///
/// 1. **Standard mode**: one row per counter with a header
/// 2. **Compact mode**: multi-column grid with "name: value" cells
///
/// The final report always ends with an `Expected: N` line.
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    layout: Layout,
}

impl TableObserver {
    /// Creates a table observer: rounded borders, header row, no title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the border style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.layout.style = style;
        self
    }

    /// Shows or hides the header row. Compact tables never have one.
    pub fn with_header(mut self, show: bool) -> Self {
        self.layout.header = show;
        self
    }

    /// Prints `title` on its own line above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.layout.title = Some(title.into());
        self
    }

    /// Switches between one row per counter and the compact grid.
    pub fn compact(mut self, enabled: bool) -> Self {
        self.layout.compact = enabled;
        self
    }

    /// Counters per row of the compact grid, at least one.
    pub fn columns(mut self, count: usize) -> Self {
        self.layout.columns = count.max(1);
        self
    }

    fn titled(&self, table: String) -> String {
        match self.layout.title {
            Some(ref title) => format!("{}\n{}", title, table),
            None => table,
        }
    }

    fn finish_rows(&self, mut table: Table) -> String {
        self.layout.style.apply(&mut table);
        if !self.layout.header {
            table.with(Remove::row(Rows::first()));
        }
        self.titled(table.to_string())
    }

    /// Lays `name: value` cells out row-major; the last row is padded.
    fn finish_grid<'a>(&self, cells: impl Iterator<Item = (&'a str, u64)>) -> String {
        let cells: Vec<String> = cells
            .map(|(name, value)| format!("{}{}{}", name, CELL_SEPARATOR, value))
            .collect();
        if cells.is_empty() {
            return String::new();
        }

        let columns = self.layout.columns;
        let mut builder = Builder::default();
        for chunk in cells.chunks(columns) {
            let mut row = chunk.to_vec();
            row.resize(columns, String::new());
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.layout.style.apply(&mut table);
        self.titled(table.to_string())
    }

    /// Renders an intermediate snapshot.
    pub fn render(&self, snapshot: &Snapshot) -> String {
        if self.layout.compact {
            return self.finish_grid(snapshot.iter().map(|s| (s.name(), s.value)));
        }

        let rows: Vec<SampleRow> = snapshot
            .iter()
            .map(|s| SampleRow {
                name: s.name(),
                ordering: ordering_label(s.discipline),
                value: s.value,
            })
            .collect();
        self.finish_rows(Table::new(&rows))
    }

    /// Renders the final report followed by the expected value.
    pub fn render_report(&self, report: &Report) -> String {
        let outcomes = report.outcomes();

        let table = if self.layout.compact {
            self.finish_grid(outcomes.iter().map(|o| (o.discipline.name(), o.observed)))
        } else {
            let rows: Vec<OutcomeRow> = outcomes
                .iter()
                .map(|o| OutcomeRow {
                    name: o.discipline.name(),
                    ordering: ordering_label(o.discipline),
                    value: o.observed,
                    lost: o.lost,
                    status: if o.is_exact() {
                        "ok"
                    } else if o.is_violation() {
                        "VIOLATION"
                    } else {
                        "lost updates"
                    },
                })
                .collect();
            self.finish_rows(Table::new(&rows))
        };

        format!("{}\nExpected: {}", table, report.expected)
    }
}
