//! Tabular summary of a finished batch

use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Style};

use super::QueryExport;

/// Render one row per exported query
pub fn render_summary(exports: &[QueryExport]) -> String {
    let mut builder = Builder::default();
    builder.push_record(
        ["query", "file", "records", "bytes", "ms"]
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<String>>(),
    );

    for export in exports {
        builder.push_record(vec![
            export.query.name().to_string(),
            export.report.path.display().to_string(),
            export.report.records.to_string(),
            export.report.bytes.to_string(),
            export.report.elapsed_ms.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    table.modify(Rows::first(), Alignment::center());
    table.to_string()
}
