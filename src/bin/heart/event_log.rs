// JSONL Event Log Writer
// One JSON line per engine event for independent analysis

use heart_engine::EventRecord;
use std::io::Write;
use std::path::Path;

/// Write every record to `path`, creating parent directories as needed.
pub fn write_jsonl(path: &Path, records: &[EventRecord]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_records(std::io::BufWriter::new(file), records)
}

fn write_records<W: Write>(mut out: W, records: &[EventRecord]) -> std::io::Result<()> {
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(out, "{}", line)?;
    }
    out.flush()
}
