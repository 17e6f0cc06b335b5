//! Console presentation of audit results.

use std::io::Write;

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use tether_audit::{AuditReport, Divergence, Reporter};
use tether_core::{Hunk, RelPath};

/// Prints an [`AuditReport`] as colored category listings plus a summary.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "category")]
    category: &'static str,
    #[tabled(rename = "files")]
    files: usize,
    #[tabled(rename = "fatal")]
    fatal: &'static str,
}

impl<W: Write> ConsoleReporter<W> {
    fn render(&mut self, report: &AuditReport) -> std::io::Result<()> {
        let out = &mut self.out;

        if !report.missing.is_empty() {
            writeln!(out, "{}", "Missing files (declared, not on disk):".red().bold())?;
            write_paths(out, &report.missing, |p| p.red().to_string())?;
        }

        if !report.unexpected.is_empty() {
            if report.strict {
                writeln!(out, "{}", "Unexpected files (strict mode):".red().bold())?;
                write_paths(out, &report.unexpected, |p| p.red().to_string())?;
            } else {
                writeln!(
                    out,
                    "{}",
                    "Unexpected files (warning, not strict):".yellow().bold()
                )?;
                write_paths(out, &report.unexpected, |p| p.yellow().to_string())?;
            }
        }

        for divergence in &report.divergences {
            write_divergence(out, divergence)?;
        }

        let rows = vec![
            SummaryRow {
                category: "matched",
                files: report.matched.len(),
                fatal: "no",
            },
            SummaryRow {
                category: "missing",
                files: report.missing.len(),
                fatal: "yes",
            },
            SummaryRow {
                category: "unexpected",
                files: report.unexpected.len(),
                fatal: if report.strict { "yes" } else { "no" },
            },
            SummaryRow {
                category: "allowed extra",
                files: report.tolerated_extra.len(),
                fatal: "no",
            },
            SummaryRow {
                category: "divergent",
                files: report.divergences.len(),
                fatal: "yes",
            },
        ];
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        writeln!(out, "{table}")?;

        if report.passed() {
            writeln!(out, "{} audit passed", "✓".green().bold())?;
        } else {
            writeln!(
                out,
                "{} audit failed ({} problem(s))",
                "✗".red().bold(),
                report.failures().len()
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, report: &AuditReport) {
        // Console output is best effort; a closed pipe must not hide the exit status.
        let _ = self.render(report);
    }
}

fn write_paths(
    out: &mut impl Write,
    paths: &[RelPath],
    style: impl Fn(&str) -> String,
) -> std::io::Result<()> {
    for path in paths {
        writeln!(out, "  {}", style(path.as_str()))?;
    }
    Ok(())
}

fn write_divergence(out: &mut impl Write, divergence: &Divergence) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {}",
        "Divergent file:".red().bold(),
        divergence.file.as_str().bold()
    )?;
    if !divergence.unexpected.is_empty() {
        writeln!(out, "  unexpected changes (local → upstream):")?;
        write_hunks(out, &divergence.unexpected)?;
    }
    if !divergence.missing.is_empty() {
        writeln!(out, "  recorded patches not observed:")?;
        write_hunks(out, &divergence.missing)?;
    }
    Ok(())
}

fn write_hunks(out: &mut impl Write, hunks: &[Hunk]) -> std::io::Result<()> {
    for hunk in hunks {
        writeln!(out, "    {}", hunk.header().cyan())?;
        for line in &hunk.lines {
            let styled = if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.bright_black().to_string()
            };
            writeln!(out, "    {styled}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(report: &AuditReport) -> String {
        colored::control::set_override(false);
        let mut reporter = ConsoleReporter { out: Vec::new() };
        reporter.report(report);
        String::from_utf8(reporter.out).expect("utf8")
    }

    #[test]
    fn passing_report_has_summary_line() {
        let text = render(&AuditReport {
            matched: vec![RelPath::from("a.js")],
            ..AuditReport::default()
        });
        assert!(text.contains("audit passed"));
        assert!(text.contains("matched"));
    }

    #[test]
    fn failing_report_lists_every_category() {
        let text = render(&AuditReport {
            strict: true,
            missing: vec![RelPath::from("gone.js")],
            unexpected: vec![RelPath::from("stray.txt")],
            divergences: vec![Divergence {
                file: RelPath::from("x.js"),
                unexpected: vec![Hunk {
                    old_start: 2,
                    old_lines: 1,
                    new_start: 2,
                    new_lines: 1,
                    lines: vec!["-local".into(), "+remote".into()],
                }],
                missing: vec![],
                found: vec![],
            }],
            ..AuditReport::default()
        });
        assert!(text.contains("gone.js"));
        assert!(text.contains("Unexpected files (strict mode)"));
        assert!(text.contains("stray.txt"));
        assert!(text.contains("Divergent file: x.js"));
        assert!(text.contains("@@ -2,1 +2,1 @@"));
        assert!(text.contains("+remote"));
        assert!(text.contains("audit failed (3 problem(s))"));
    }

    #[test]
    fn non_strict_unexpected_is_a_warning() {
        let text = render(&AuditReport {
            unexpected: vec![RelPath::from("stray.txt")],
            ..AuditReport::default()
        });
        assert!(text.contains("warning, not strict"));
        assert!(text.contains("audit passed"));
    }
}
