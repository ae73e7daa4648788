use crate::errors::Result;
use crate::types::ProfileRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Writes `records` in `format`, flushing the writer at the end.
pub fn write_records<W: Write>(
    records: &[ProfileRecord],
    format: OutputFormat,
    mut writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(records, &mut writer)?,
        OutputFormat::Json => write_json(records, &mut writer)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_csv<W: Write>(records: &[ProfileRecord], writer: &mut W) -> Result<()> {
    write!(writer, "Name,URL\r\n")?;
    for record in records {
        write!(
            writer,
            "{},{}\r\n",
            csv_escape(&record.display_name),
            csv_escape(&record.profile_url)
        )?;
    }
    Ok(())
}

fn write_json<W: Write>(records: &[ProfileRecord], writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, records)?;
    writeln!(writer)?;
    Ok(())
}

/// Quotes a field if it contains a delimiter, quote or line break.
fn csv_escape(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[ProfileRecord], format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_records(records, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn csv_has_header_and_rows() {
        let records = vec![
            ProfileRecord::new("Alice", "https://x.com/alice"),
            ProfileRecord::new("", "https://x.com/anon"),
        ];
        assert_eq!(
            render(&records, OutputFormat::Csv),
            "Name,URL\r\nAlice,https://x.com/alice\r\n,https://x.com/anon\r\n"
        );
    }

    #[test]
    fn csv_quotes_commas_and_quotes() {
        let records = vec![ProfileRecord::new(
            "Smith, \"Jo\"",
            "https://x.com/jo",
        )];
        assert_eq!(
            render(&records, OutputFormat::Csv),
            "Name,URL\r\n\"Smith, \"\"Jo\"\"\",https://x.com/jo\r\n"
        );
    }

    #[test]
    fn csv_with_no_records_is_just_the_header() {
        assert_eq!(render(&[], OutputFormat::Csv), "Name,URL\r\n");
    }

    #[test]
    fn json_is_two_space_indented() {
        let records = vec![ProfileRecord::new("Bob", "https://x.com/bob")];
        assert_eq!(
            render(&records, OutputFormat::Json),
            "[\n  {\n    \"Name\": \"Bob\",\n    \"URL\": \"https://x.com/bob\"\n  }\n]\n"
        );
    }

    #[test]
    fn json_empty_list() {
        assert_eq!(render(&[], OutputFormat::Json), "[]\n");
    }
}
