// CSV/TSV import. Decodes bytes into a header row + raw cell grid; the
// engine infers column types after the grid is built.

use tabletalk_engine::Value;

use crate::error::IngestError;
use crate::RawGrid;

pub fn decode(bytes: &[u8]) -> Result<RawGrid, IngestError> {
    let content = bytes_as_utf8(bytes);
    let delimiter = sniff_delimiter(&content);
    decode_with_delimiter(&content, delimiter)
}

/// Decode bytes to UTF-8, falling back to Windows-1252 (common for
/// Excel-exported CSVs) when the bytes are not valid UTF-8.
fn bytes_as_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines. The candidate producing the most consistent
/// field count (>1 field) wins; comma on a tie or no viable candidate.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn decode_with_delimiter(content: &str, delimiter: u8) -> Result<RawGrid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(rec) => rec
            .map_err(|e| IngestError::Decode(e.to_string()))?
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<String>>(),
        None => return Err(IngestError::Decode("empty CSV input".into())),
    };

    let mut rows = Vec::new();
    for rec in records {
        let rec = rec.map_err(|e| IngestError::Decode(e.to_string()))?;
        rows.push(rec.iter().map(cell_value).collect::<Vec<Value>>());
    }

    Ok(RawGrid { header, rows })
}

fn cell_value(field: &str) -> Value {
    if field.trim().is_empty() {
        Value::Null
    } else {
        Value::Text(field.to_string())
    }
}
