//! medkg Export Layer
//!
//! Writes graphs, averaged graphs and batch statistics as flat CSV files
//! with stable column order. The statistics file is append-only and doubles
//! as the batch resume journal: a patient id present in it is a patient
//! whose unit of work completed.

#![warn(missing_docs)]

use medkg_domain::{AssociationGraph, AveragedGraph, PatientId};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing or reading export files.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of a node list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node code.
    pub code: String,
    /// Node category name.
    pub category: String,
    /// Human-readable label, falling back to the code.
    pub label: String,
}

/// One row of a per-patient edge list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Lexicographically smaller code.
    pub node1: String,
    /// Lexicographically larger code.
    pub node2: String,
    /// Association kind name.
    pub kind: String,
    /// Classification name (`literature` or `found`).
    pub class: String,
}

/// One row of a cohort-averaged edge list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AveragedEdgeRecord {
    /// Lexicographically smaller code.
    pub node1: String,
    /// Lexicographically larger code.
    pub node2: String,
    /// Number of patient graphs containing the pair.
    pub count: usize,
    /// Association kind name.
    pub kind: String,
    /// Classification name.
    pub class: String,
    /// Percentage of the cohort exhibiting the pair.
    pub strength: f64,
}

/// One row of the batch statistics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Patient id.
    pub patient_id: i64,
    /// Node count of the patient's graph.
    pub nodes: usize,
    /// Edge count of the patient's graph.
    pub edges: usize,
    /// Edges classified found after validation.
    pub found_edges: usize,
}

/// Write a patient graph's node list (`code,category,label`).
///
/// `label` resolves a code to a display name; `None` falls back to the code.
pub fn write_node_list(
    path: &Path,
    graph: &AssociationGraph,
    label: impl Fn(&str) -> Option<String>,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (code, category) in graph.nodes() {
        writer.serialize(NodeRecord {
            code: code.to_string(),
            category: category.as_str().to_string(),
            label: label(code).unwrap_or_else(|| code.to_string()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a patient graph's edge list (`node1,node2,kind,class`).
pub fn write_edge_list(path: &Path, graph: &AssociationGraph) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (key, edge) in graph.edges() {
        writer.serialize(EdgeRecord {
            node1: key.first().to_string(),
            node2: key.second().to_string(),
            kind: edge.kind.as_str().to_string(),
            class: edge.class.as_str().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an averaged graph's node list (`code,category,label`).
pub fn write_averaged_node_list(
    path: &Path,
    averaged: &AveragedGraph,
    label: impl Fn(&str) -> Option<String>,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for node in &averaged.nodes {
        writer.serialize(NodeRecord {
            code: node.code.clone(),
            category: node.category.as_str().to_string(),
            label: label(&node.code).unwrap_or_else(|| node.code.clone()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write an averaged graph's edge list
/// (`node1,node2,count,kind,class,strength`).
pub fn write_averaged_edge_list(
    path: &Path,
    averaged: &AveragedGraph,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for edge in &averaged.edges {
        writer.serialize(AveragedEdgeRecord {
            node1: edge.node1.clone(),
            node2: edge.node2.clone(),
            count: edge.count,
            kind: edge.kind.as_str().to_string(),
            class: edge.class.as_str().to_string(),
            strength: edge.strength,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Append-only writer for the batch statistics file.
///
/// Safe to reopen across process restarts: the header is written once, rows
/// accumulate, and [`StatsWriter::completed_patients`] reads the ids already
/// journaled so a restarted batch can skip them.
pub struct StatsWriter {
    path: std::path::PathBuf,
}

impl StatsWriter {
    /// Create a writer for the given statistics file path.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Patient ids already recorded in the file (empty if it doesn't exist).
    pub fn completed_patients(&self) -> Result<Vec<PatientId>, ExportError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut ids = Vec::new();
        for record in reader.deserialize::<StatsRecord>() {
            ids.push(PatientId::new(record?.patient_id));
        }
        Ok(ids)
    }

    /// Append one row, creating the file (with header) on first use.
    pub fn append(&self, record: &StatsRecord) -> Result<(), ExportError> {
        let new_file = !self.path.exists()
            || std::fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(new_file)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }
}
