//! CSV loading of event tables and persistence of search records and
//! submission files.

use std::path::Path;

use anyhow::Context;
use ndarray::{Array1, Array2};

use crate::data_handling::Dataset;
use crate::search::SearchRecord;

/// Load a delimited event table.
///
/// Expected layout: header row, column 0 = integer event id, column 1 =
/// label category (`"s"` maps to 1, anything else to 0; unlabeled test
/// tables carry a placeholder there), remaining columns = numeric features
/// with the raw sentinel encoding left untouched.
///
/// `sub_sample > 0` keeps only every `sub_sample`-th row, for smoke runs.
pub fn load_events<P: AsRef<Path>>(path: P, sub_sample: usize) -> anyhow::Result<Dataset> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut ids = Vec::new();
    let mut labels = Vec::new();
    let mut data = Vec::new();
    let mut ncols = None;

    for (row, result) in reader.records().enumerate() {
        if sub_sample > 0 && row % sub_sample != 0 {
            continue;
        }
        let record = result.with_context(|| format!("reading row {} of {}", row, path.display()))?;
        if record.len() < 3 {
            anyhow::bail!(
                "row {} of {}: expected id, label and features, got {} fields",
                row,
                path.display(),
                record.len()
            );
        }

        let id: i64 = record[0]
            .trim()
            .parse()
            .with_context(|| format!("row {}: invalid event id {:?}", row, &record[0]))?;
        let label = if record[1].trim() == "s" { 1.0 } else { 0.0 };

        let features = record.len() - 2;
        match ncols {
            None => ncols = Some(features),
            Some(expected) if expected != features => anyhow::bail!(
                "row {} of {}: expected {} feature columns, got {}",
                row,
                path.display(),
                expected,
                features
            ),
            Some(_) => {}
        }
        for field in record.iter().skip(2) {
            let value: f64 = field
                .trim()
                .parse()
                .with_context(|| format!("row {}: invalid feature value {:?}", row, field))?;
            data.push(value);
        }
        ids.push(id);
        labels.push(label);
    }

    let ncols = ncols.ok_or_else(|| anyhow::anyhow!("{} contains no data rows", path.display()))?;
    let x = Array2::from_shape_vec((ids.len(), ncols), data)
        .context("assembling feature matrix")?;
    let dataset = Dataset::new(Array1::from_vec(ids), x, Array1::from_vec(labels))?;
    log::info!(
        "loaded {}: {} rows, {} feature columns",
        path.display(),
        dataset.nrows(),
        dataset.ncols()
    );
    Ok(dataset)
}

/// Write one CSV row per evaluated grid cell.
pub fn write_search_records<P: AsRef<Path>>(
    path: P,
    records: &[SearchRecord],
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "degree", "top_k", "lambda", "gamma", "max_iters", "folds", "f1_mean", "f1_std",
        "acc_mean", "acc_std",
    ])?;
    for record in records {
        let p = &record.params;
        let s = &record.scores;
        writer.write_record([
            p.degree.to_string(),
            p.top_k.to_string(),
            p.lambda.to_string(),
            p.gamma.to_string(),
            p.max_iters.to_string(),
            p.folds.to_string(),
            s.f1_mean.to_string(),
            s.f1_std.to_string(),
            s.acc_mean.to_string(),
            s.acc_std.to_string(),
        ])?;
    }
    writer.flush()?;
    log::info!("wrote {} search records to {}", records.len(), path.display());
    Ok(())
}

/// Write a submission table: `Id,Prediction` with predictions in {-1, 1}.
pub fn write_submission<P: AsRef<Path>>(
    path: P,
    ids: &Array1<i64>,
    predictions: &Array1<f64>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        ids.len() == predictions.len(),
        "ids and predictions disagree: {} vs {}",
        ids.len(),
        predictions.len()
    );
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Id", "Prediction"])?;
    for (&id, &pred) in ids.iter().zip(predictions.iter()) {
        let encoded = if pred > 0.5 { 1 } else { -1 };
        writer.write_record([id.to_string(), encoded.to_string()])?;
    }
    writer.flush()?;
    log::info!("wrote {} predictions to {}", ids.len(), path.display());
    Ok(())
}
