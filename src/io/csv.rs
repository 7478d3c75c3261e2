//! CSV/TSV readers for the upstream pipeline artifacts

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::Array2;

use crate::data::{AdjacencyMatrix, ExpressionMatrix, HubRanking, SampleMetadata};
use crate::error::{NetdynError, Result};

/// Strip surrounding quotes from a string
fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')) {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Detect the delimiter from a header line (tab if present, else comma)
fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains('\t') {
        '\t'
    } else {
        ','
    }
}

fn parse_value(field: &str, path_desc: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| NetdynError::InvalidInput {
            reason: format!("cannot parse '{}' as a number in {}", field.trim(), path_desc),
        })
}

/// Read a labeled genes x columns numeric table
///
/// First header field is ignored, remaining header fields are column labels;
/// each data row starts with a row label followed by numeric values.
fn read_labeled_matrix<P: AsRef<Path>>(
    path: P,
    what: &str,
) -> Result<(Array2<f64>, Vec<String>, Vec<String>)> {
    let file = File::open(&path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or_else(|| NetdynError::EmptyData {
        reason: format!("empty {} file", what),
    })??;

    let delimiter = detect_delimiter(&header_line);
    let header: Vec<&str> = header_line.split(delimiter).collect();
    if header.len() < 2 {
        return Err(NetdynError::InvalidInput {
            reason: format!("not enough columns in {} header", what),
        });
    }

    let col_labels: Vec<String> = header[1..].iter().map(|s| strip_quotes(s)).collect();
    let n_cols = col_labels.len();

    let mut row_labels: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != n_cols + 1 {
            return Err(NetdynError::InvalidInput {
                reason: format!(
                    "{} row has {} columns, expected {}",
                    what,
                    fields.len(),
                    n_cols + 1
                ),
            });
        }

        row_labels.push(strip_quotes(fields[0]));
        let row: Result<Vec<f64>> = fields[1..].iter().map(|f| parse_value(f, what)).collect();
        rows.push(row?);
    }

    if rows.is_empty() {
        return Err(NetdynError::EmptyData {
            reason: format!("{} file has no data rows", what),
        });
    }

    let n_rows = rows.len();
    let mut values = Array2::zeros((n_rows, n_cols));
    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            values[[i, j]] = v;
        }
    }

    Ok((values, row_labels, col_labels))
}

/// Read a transcript-abundance matrix
///
/// Expected format: first column gene IDs, header row sample IDs.
pub fn read_expression_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionMatrix> {
    let (values, gene_ids, sample_ids) = read_labeled_matrix(path, "expression matrix")?;
    log::info!(
        "Loaded expression matrix: {} genes x {} samples",
        gene_ids.len(),
        sample_ids.len()
    );
    ExpressionMatrix::new(values, gene_ids, sample_ids)
}

/// Read sample metadata with `sample`, `time`, and `treatment` columns
/// (matched by header name, any column order)
pub fn read_sample_metadata<P: AsRef<Path>>(path: P) -> Result<SampleMetadata> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or_else(|| NetdynError::EmptyData {
        reason: "empty metadata file".to_string(),
    })??;
    let delimiter = detect_delimiter(&header_line);
    let header: Vec<String> = header_line
        .split(delimiter)
        .map(|s| strip_quotes(s).to_lowercase())
        .collect();

    let col = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| NetdynError::InvalidMetadata {
                reason: format!("missing '{}' column in metadata header", name),
            })
    };
    let sample_col = col("sample")?;
    let time_col = col("time")?;
    let treatment_col = col("treatment")?;

    let mut sample_ids = Vec::new();
    let mut time = Vec::new();
    let mut treatment = Vec::new();

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != header.len() {
            return Err(NetdynError::InvalidMetadata {
                reason: format!(
                    "metadata row has {} columns, expected {}",
                    fields.len(),
                    header.len()
                ),
            });
        }
        sample_ids.push(strip_quotes(fields[sample_col]));
        time.push(strip_quotes(fields[time_col]));
        treatment.push(strip_quotes(fields[treatment_col]));
    }

    SampleMetadata::new(sample_ids, time, treatment)
}

/// Read a module adjacency matrix
///
/// Square table with gene IDs as both header and first column; the row
/// labels must match the header labels in order.
pub fn read_adjacency_matrix<P: AsRef<Path>>(path: P) -> Result<AdjacencyMatrix> {
    let (values, row_labels, col_labels) = read_labeled_matrix(path, "adjacency matrix")?;

    if row_labels != col_labels {
        return Err(NetdynError::InvalidAdjacency {
            reason: "row labels do not match column labels".to_string(),
        });
    }

    log::info!("Loaded adjacency matrix for {} genes", row_labels.len());
    AdjacencyMatrix::new(values, row_labels)
}

/// Columns of a parsed simulation parameter table
#[derive(Debug, Clone)]
pub struct ParameterTable {
    pub gene_ids: Vec<String>,
    pub rates: Vec<f64>,
    pub capacities: Vec<f64>,
    pub initial: Vec<f64>,
}

/// Read a simulation parameter table with `gene`, `rate`,
/// `carrying_capacity`, and `initial` columns
pub fn read_parameter_table<P: AsRef<Path>>(path: P) -> Result<ParameterTable> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or_else(|| NetdynError::EmptyData {
        reason: "empty parameter table".to_string(),
    })??;
    let delimiter = detect_delimiter(&header_line);
    let header: Vec<String> = header_line
        .split(delimiter)
        .map(|s| strip_quotes(s).to_lowercase())
        .collect();

    let col = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| NetdynError::InvalidInput {
                reason: format!("missing '{}' column in parameter table header", name),
            })
    };
    let gene_col = col("gene")?;
    let rate_col = col("rate")?;
    let capacity_col = col("carrying_capacity")?;
    let initial_col = col("initial")?;

    let mut table = ParameterTable {
        gene_ids: Vec::new(),
        rates: Vec::new(),
        capacities: Vec::new(),
        initial: Vec::new(),
    };

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != header.len() {
            return Err(NetdynError::InvalidInput {
                reason: format!(
                    "parameter table row has {} columns, expected {}",
                    fields.len(),
                    header.len()
                ),
            });
        }
        table.gene_ids.push(strip_quotes(fields[gene_col]));
        table.rates.push(parse_value(fields[rate_col], "parameter table")?);
        table
            .capacities
            .push(parse_value(fields[capacity_col], "parameter table")?);
        table
            .initial
            .push(parse_value(fields[initial_col], "parameter table")?);
    }

    if table.gene_ids.is_empty() {
        return Err(NetdynError::EmptyData {
            reason: "parameter table has no data rows".to_string(),
        });
    }

    Ok(table)
}

/// Read a hub-gene ranking with `gene` and `connectivity` columns
pub fn read_hub_ranking<P: AsRef<Path>>(path: P) -> Result<HubRanking> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header_line = lines.next().ok_or_else(|| NetdynError::EmptyData {
        reason: "empty hub ranking file".to_string(),
    })??;
    let delimiter = detect_delimiter(&header_line);
    let header: Vec<String> = header_line
        .split(delimiter)
        .map(|s| strip_quotes(s).to_lowercase())
        .collect();

    let gene_col = header
        .iter()
        .position(|h| h == "gene")
        .ok_or_else(|| NetdynError::InvalidInput {
            reason: "missing 'gene' column in hub ranking header".to_string(),
        })?;
    let conn_col = header
        .iter()
        .position(|h| h == "connectivity")
        .ok_or_else(|| NetdynError::InvalidInput {
            reason: "missing 'connectivity' column in hub ranking header".to_string(),
        })?;

    let mut gene_ids = Vec::new();
    let mut connectivity = Vec::new();

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != header.len() {
            return Err(NetdynError::InvalidInput {
                reason: format!(
                    "hub ranking row has {} columns, expected {}",
                    fields.len(),
                    header.len()
                ),
            });
        }
        gene_ids.push(strip_quotes(fields[gene_col]));
        connectivity.push(parse_value(fields[conn_col], "hub ranking")?);
    }

    HubRanking::new(gene_ids, connectivity)
}
