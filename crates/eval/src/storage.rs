use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::benchmark::BenchmarkResult;
use crate::corpus::InputText;
use crate::stats::GroupSummary;

pub const INPUTS_FILE: &str = "input_articles.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Characters that are unsafe in file names on common filesystems
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Filesystem-safe fragment for a model id, e.g. `hf.co/Foo:Q8_0` -> `hf.co_Foo_Q8_0`
pub fn sanitize_model_id(model: &str) -> String {
    model
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

pub fn results_file_name(model: &str) -> String {
    format!("outputs_{}.jsonl", sanitize_model_id(model))
}

pub fn write_inputs(dir: &Path, texts: &[InputText]) -> Result<PathBuf> {
    let path = dir.join(INPUTS_FILE);
    write_jsonl(&path, texts)?;
    Ok(path)
}

/// Fails when two different model ids would share one results file.
pub fn check_distinct_file_names<'a>(models: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for model in models {
        let file_name = results_file_name(model);
        match seen.get(&file_name) {
            Some(other) if *other != model => anyhow::bail!(
                "Models '{}' and '{}' would both be written to {}",
                other,
                model,
                file_name
            ),
            Some(_) => {}
            None => {
                seen.insert(file_name, model);
            }
        }
    }

    Ok(())
}

/// One JSONL file per model, in the order models first appear.
pub fn write_results(dir: &Path, results: &[BenchmarkResult]) -> Result<Vec<PathBuf>> {
    let groups = group_by_model(results);
    check_distinct_file_names(groups.iter().map(|(model, _)| *model))?;

    let mut paths = Vec::new();
    for (model, group) in groups {
        let path = dir.join(results_file_name(model));
        write_jsonl(&path, &group[..])?;
        paths.push(path);
    }

    Ok(paths)
}

pub fn write_summary(dir: &Path, summary: &[GroupSummary]) -> Result<PathBuf> {
    fs::create_dir_all(dir).context(format!("Failed to create directory: {:?}", dir))?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).context(format!("Failed to write file: {:?}", path))?;
    Ok(path)
}

pub fn read_inputs(path: &Path) -> Result<Vec<InputText>> {
    read_jsonl(path)
}

pub fn read_results(path: &Path) -> Result<Vec<BenchmarkResult>> {
    read_jsonl(path)
}

pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {:?}", parent))?;
    }

    let file = File::create(path).context(format!("Failed to create file: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush().context(format!("Failed to write file: {:?}", path))?;

    Ok(())
}

pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).context(format!("Failed to open file: {:?}", path))?;
    let mut items = Vec::new();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line)
            .context(format!("Invalid JSON on line {} of {:?}", idx + 1, path))?;
        items.push(item);
    }

    Ok(items)
}

fn group_by_model(results: &[BenchmarkResult]) -> Vec<(&str, Vec<&BenchmarkResult>)> {
    let mut groups: Vec<(&str, Vec<&BenchmarkResult>)> = Vec::new();

    for result in results {
        match groups.iter_mut().find(|(model, _)| *model == result.model) {
            Some((_, group)) => group.push(result),
            None => groups.push((result.model.as_str(), vec![result])),
        }
    }

    groups
}
