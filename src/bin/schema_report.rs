//! Out-of-band diagnostic: dump the table layout of every database-looking
//! file in a directory to a fixed report file. Useful when a new translation
//! bundle arrives and the column names need checking before the app trusts
//! them. The running application never invokes this.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Where the dump lands, relative to the working directory.
const REPORT_FILE: &str = "schema-report.txt";

fn main() -> Result<()> {
    let target = std::env::args().nth(1).unwrap_or_else(|| "Versiones".to_string());
    let target = Path::new(&target);

    if !target.is_dir() {
        anyhow::bail!("directory not found: {}", target.display());
    }

    let mut files: Vec<_> = fs::read_dir(target)
        .with_context(|| format!("failed to read {}", target.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_database_like(path))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!(
            "no database files (*sql*, *.db) found in {}",
            target.display()
        );
    }

    let mut report = format!("=== SCHEMA REPORT ({}) ===\n\n", target.display());
    for path in &files {
        describe_database(path, &mut report);
        report.push_str(&format!("\n{}\n\n", "=".repeat(40)));
    }

    fs::write(REPORT_FILE, &report)
        .with_context(|| format!("failed to write {REPORT_FILE}"))?;
    println!("schema dump written to {REPORT_FILE}");
    Ok(())
}

/// Match the loose naming the bundles use: anything with `sql` in the name
/// (SQLite3, sqlite, .SQLite3) plus plain `.db` files.
fn is_database_like(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.contains("sql") || name.ends_with(".db")
}

/// Append one file's tables and columns to the report. A file that refuses to
/// open or query gets its error recorded inline; the scan continues.
fn describe_database(path: &Path, report: &mut String) {
    let _ = writeln!(report, "FILE: {}", path.display());
    match dump_tables(path) {
        Ok(tables) => {
            let _ = write!(report, "{tables}");
        }
        Err(err) => {
            let _ = writeln!(report, "  ERROR: {err}");
        }
    }
}

fn dump_tables(path: &Path) -> Result<String> {
    let conn = Connection::open(path)?;
    let mut out = String::new();

    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for table in tables {
        let _ = writeln!(out, "  TABLE: {table}");
        let mut info = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
        let columns = info
            .query_map([], |row| {
                Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (name, kind) in columns {
            let _ = writeln!(out, "    - {name} ({kind})");
        }
        let _ = writeln!(out, "  {}", "-".repeat(20));
    }

    Ok(out)
}
