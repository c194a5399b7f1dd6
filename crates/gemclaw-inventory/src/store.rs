//! SQLite inventory store.
//!
//! The table is (re)built from a CSV file in one transaction and only read
//! afterwards. Generated queries go through [`InventoryDb::run_read_only`].

use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use gemclaw_core::error::{GemClawError, Result};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OpenFlags, params_from_iter};

use crate::guard;

/// Number of sample rows included in the schema description.
const SAMPLE_ROWS: usize = 3;

pub struct InventoryDb {
    conn: Mutex<Connection>,
}

fn db_err(e: impl std::fmt::Display) -> GemClawError {
    GemClawError::Database(e.to_string())
}

/// Quote an identifier for SQLite.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column affinity inferred from CSV values.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut ty = ColumnType::Integer;
        for v in values.map(str::trim).filter(|v| !v.is_empty()) {
            if ty == ColumnType::Integer && v.parse::<i64>().is_err() {
                ty = ColumnType::Real;
            }
            if ty == ColumnType::Real && v.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        ty
    }

    fn convert(self, raw: &str) -> Value {
        let v = raw.trim();
        if v.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnType::Integer => v.parse().map(Value::Integer).unwrap_or(Value::Null),
            ColumnType::Real => v.parse().map(Value::Real).unwrap_or(Value::Null),
            ColumnType::Text => Value::Text(raw.to_string()),
        }
    }
}

impl InventoryDb {
    /// Open (or create) the database file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an existing database file read-only. Never creates the file.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(GemClawError::Database(format!(
                "inventory database {} does not exist (run `gemclaw init-db` first)",
                path.display()
            )));
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(db_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Replace `table` with the contents of a CSV file. Returns the row count.
    pub fn load_csv(&self, csv_path: &Path, table: &str) -> Result<usize> {
        let file = std::fs::File::open(csv_path).map_err(|e| {
            GemClawError::Database(format!("cannot open {}: {e}", csv_path.display()))
        })?;
        self.load_csv_reader(file, table)
    }

    /// Replace `table` with CSV data read from `reader` (header row required).
    pub fn load_csv_reader<R: Read>(&self, reader: R, table: &str) -> Result<usize> {
        if table.trim().is_empty() {
            return Err(GemClawError::Database("table name is empty".into()));
        }

        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .map_err(db_err)?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() { format!("column_{i}") } else { h.to_string() }
            })
            .collect();
        if headers.is_empty() {
            return Err(GemClawError::Database("CSV has no header row".into()));
        }

        let mut records: Vec<csv::StringRecord> = Vec::new();
        for record in rdr.records() {
            records.push(record.map_err(db_err)?);
        }

        let types: Vec<ColumnType> = (0..headers.len())
            .map(|i| ColumnType::infer(records.iter().map(|r| r.get(i).unwrap_or(""))))
            .collect();

        let columns = headers
            .iter()
            .zip(&types)
            .map(|(h, t)| format!("\t{} {}", quote_ident(h), t.sql()))
            .collect::<Vec<_>>()
            .join(", \n");
        let create = format!("CREATE TABLE {} (\n{}\n)", quote_ident(table), columns);
        let placeholders = vec!["?"; headers.len()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", quote_ident(table), placeholders);

        let mut conn = self.conn.lock().map_err(db_err)?;
        let tx = conn.transaction().map_err(db_err)?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .map_err(db_err)?;
        tx.execute_batch(&create).map_err(db_err)?;
        {
            let mut stmt = tx.prepare(&insert).map_err(db_err)?;
            for record in &records {
                let values = types
                    .iter()
                    .enumerate()
                    .map(|(i, t)| t.convert(record.get(i).unwrap_or("")));
                stmt.execute(params_from_iter(values)).map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;

        tracing::info!("📦 Loaded {} rows into '{}'", records.len(), table);
        Ok(records.len())
    }

    /// User tables, sorted by name.
    pub fn tables(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().map_err(db_err)?;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(db_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(names)
    }

    /// Number of rows in `table`.
    pub fn row_count(&self, table: &str) -> Result<i64> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
            [],
            |r| r.get(0),
        )
        .map_err(db_err)
    }

    /// Schema description handed to the model: each table's `CREATE TABLE`
    /// statement followed by a few sample rows.
    ///
    /// Fails when the database has no tables, since no question can be
    /// answered against it.
    pub fn table_info(&self) -> Result<String> {
        let tables = self.tables()?;
        if tables.is_empty() {
            return Err(GemClawError::Database(
                "inventory database has no tables (run `gemclaw init-db` first)".into(),
            ));
        }

        let conn = self.conn.lock().map_err(db_err)?;
        let mut sections = Vec::with_capacity(tables.len());
        for table in &tables {
            let create: String = conn
                .query_row(
                    "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    rusqlite::params![table],
                    |r| r.get(0),
                )
                .map_err(db_err)?;

            let mut stmt = conn
                .prepare(&format!("SELECT * FROM {} LIMIT {SAMPLE_ROWS}", quote_ident(table)))
                .map_err(db_err)?;
            let header = stmt.column_names().join("\t");
            let ncols = stmt.column_count();
            let mut rows = stmt.query([]).map_err(db_err)?;
            let mut samples = Vec::new();
            while let Some(row) = rows.next().map_err(db_err)? {
                let cells = (0..ncols)
                    .map(|i| row.get_ref(i).map(render_plain))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(db_err)?;
                samples.push(cells.join("\t"));
            }

            sections.push(format!(
                "\n{create}\n\n/*\n{SAMPLE_ROWS} rows from {table} table:\n{header}\n{}\n*/",
                samples.join("\n")
            ));
        }
        Ok(sections.join("\n\n"))
    }

    /// Execute a model-generated query and render the result rows.
    ///
    /// Rows render as a list of tuples (`[(21551,)]`, `[('Ideal', 326)]`);
    /// no rows render as the empty string. At most `max_rows` rows are read.
    pub fn run_read_only(&self, sql: &str, max_rows: usize) -> Result<String> {
        guard::ensure_read_only(sql).map_err(GemClawError::Database)?;

        let conn = self.conn.lock().map_err(db_err)?;
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        if !stmt.readonly() {
            return Err(GemClawError::Database(
                "statement would modify the database".into(),
            ));
        }

        let ncols = stmt.column_count();
        let mut rows = stmt.query([]).map_err(db_err)?;
        let mut rendered = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            if rendered.len() >= max_rows {
                tracing::debug!("result truncated at {max_rows} rows");
                break;
            }
            let cells = (0..ncols)
                .map(|i| row.get_ref(i).map(render_literal))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(db_err)?;
            rendered.push(if cells.len() == 1 {
                format!("({},)", cells[0])
            } else {
                format!("({})", cells.join(", "))
            });
        }

        if rendered.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("[{}]", rendered.join(", ")))
    }
}

fn render_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Cell rendering for sample rows (no quoting).
fn render_plain(v: ValueRef<'_>) -> String {
    match v {
        ValueRef::Null => "None".into(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => render_real(f),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

/// Cell rendering for query results (text quoted).
fn render_literal(v: ValueRef<'_>) -> String {
    match v {
        ValueRef::Text(t) => {
            format!("'{}'", String::from_utf8_lossy(t).replace('\'', "\\'"))
        }
        other => render_plain(other),
    }
}
