//! Rendering an [`AnalysisResult`] for the terminal.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::analyzer::AnalysisResult;

/// Write the result as JSON, one document followed by a newline.
pub fn write_json<W: Write>(wtr: &mut W, result: &AnalysisResult, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *wtr, result)?;
    } else {
        serde_json::to_writer(&mut *wtr, result)?;
    }
    writeln!(wtr)
}

/// Write the result as two aligned, ranked tables under a summary line.
pub fn write_text<W: WriteColor>(wtr: &mut W, result: &AnalysisResult) -> io::Result<()> {
    let mut heading = ColorSpec::new();
    heading.set_bold(true);
    let mut code = ColorSpec::new();
    code.set_fg(Some(Color::Cyan)).set_bold(true);

    let summary = &result.summary;
    wtr.set_color(&heading)?;
    write!(wtr, "Summary")?;
    wtr.reset()?;
    writeln!(
        wtr,
        ": {} lines, {} public IPs, {} unique",
        summary.total_lines, summary.total_ips_found, summary.unique_ips_found
    )?;

    let ip_width = result
        .ip_list
        .iter()
        .map(|r| r.ip.to_string().len())
        .max()
        .unwrap_or(0)
        .max("IP".len());

    writeln!(wtr)?;
    wtr.set_color(&heading)?;
    writeln!(wtr, "{:>7}  {:<ip_width$}  {:<4} {}", "COUNT", "IP", "CODE", "COUNTRY")?;
    wtr.reset()?;
    for record in &result.ip_list {
        write!(wtr, "{:>7}  {:<ip_width$}  ", record.count, record.ip.to_string())?;
        wtr.set_color(&code)?;
        write!(wtr, "{:<4}", record.country_code)?;
        wtr.reset()?;
        writeln!(wtr, " {}", record.country_name)?;
    }

    writeln!(wtr)?;
    wtr.set_color(&heading)?;
    writeln!(wtr, "{:>7}  {:<4} {}", "COUNT", "CODE", "COUNTRY")?;
    wtr.reset()?;
    for entry in &result.country_summary {
        write!(wtr, "{:>7}  ", entry.count)?;
        wtr.set_color(&code)?;
        write!(wtr, "{:<4}", entry.country_code)?;
        wtr.reset()?;
        writeln!(wtr, " {}", entry.country_name)?;
    }
    Ok(())
}
