use crate::error::Result;
use crate::table::Table;
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Output file name for a harvest taken on `date`
pub fn output_file_name(date: NaiveDate) -> String {
    format!("{}_wta_hikes.csv", date.format("%Y-%m-%d"))
}

/// Default output path: today's dated file in the working directory
pub fn default_output_path() -> PathBuf {
    PathBuf::from(output_file_name(chrono::Local::now().date_naive()))
}

/// Writes the table as CSV to `path`, creating parent directories as needed
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    table.write_csv(BufWriter::new(file))?;
    ::log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::HikeRecord;

    #[test]
    fn test_output_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(output_file_name(date), "2026-10-19_wta_hikes.csv");
    }

    #[test]
    fn test_write_table_creates_directories() {
        let dir = std::env::temp_dir().join(format!("hike-harvest-{}", std::process::id()));
        let path = dir.join("nested").join("out.csv");

        let mut table = Table::new();
        table.commit_row(HikeRecord::new("https://hikes.example.org/x")).unwrap();
        write_table(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("TITLE,REGION,"));
        assert!(written.contains("https://hikes.example.org/x"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
