use std::{collections::HashMap, fs, path::Path};

use log::info;

use crate::error::{NodeError, Result};

#[derive(Debug, Clone)]
enum Table {
    /// Multi-label classification, every sample holds a subset of `vocabulary`.
    Classes {
        vocabulary: Vec<String>,
        samples: HashMap<String, Vec<String>>,
    },
    /// Regression, every sample holds its target values.
    Values {
        width: usize,
        samples: HashMap<String, Vec<f32>>,
    },
}

/// Maps sample file names to label vectors, from a `filename,label[,label...]` table.
#[derive(Debug, Clone)]
pub struct LabelSource {
    table: Table,
}

impl LabelSource {
    /// Reads the label table at `path`.
    ///
    /// # Errors
    /// Returns `NodeError::Io` if the table can't be read, see [`LabelSource::parse`]
    /// for the rest.
    pub fn load<P: AsRef<Path>>(path: P, classification: bool) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, classification)
    }

    /// Parses a label table.
    ///
    /// For classification the vocabulary is built from the labels in the order
    /// they first appear. Blank lines are skipped.
    ///
    /// # Errors
    /// Returns `NodeError::Labels` if a line has fewer than two columns or, for
    /// regression, a value that isn't a number.
    pub fn parse(content: &str, classification: bool) -> Result<Self> {
        let rows = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let mut parts = line.split(',').map(str::trim);
                let name = parts.next().unwrap_or_default().to_string();
                let columns: Vec<&str> = parts.collect();

                if columns.is_empty() {
                    return Err(NodeError::Labels {
                        line: i + 1,
                        msg: format!("expected at least 2 columns in '{line}'"),
                    });
                }

                Ok((i + 1, name, columns))
            })
            .collect::<Result<Vec<_>>>()?;

        let table = if classification {
            let mut vocabulary: Vec<String> = Vec::new();
            let mut samples = HashMap::with_capacity(rows.len());

            for (_, name, columns) in rows {
                for label in &columns {
                    if !vocabulary.iter().any(|known| known == label) {
                        vocabulary.push(label.to_string());
                    }
                }
                samples.insert(name, columns.into_iter().map(str::to_string).collect());
            }

            Table::Classes {
                vocabulary,
                samples,
            }
        } else {
            let mut width = 0;
            let mut samples = HashMap::with_capacity(rows.len());

            for (line, name, columns) in rows {
                let values = columns
                    .iter()
                    .map(|v| {
                        v.parse::<f32>().map_err(|_| NodeError::Labels {
                            line,
                            msg: format!("cannot parse '{v}' as f32"),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                width = width.max(values.len());
                samples.insert(name, values);
            }

            Table::Values { width, samples }
        };

        let source = Self { table };
        info!(
            samples = source.len(),
            labels = source.num_labels();
            "loaded label table"
        );
        Ok(source)
    }

    /// The width of the label vectors: the vocabulary size for classification,
    /// the widest row for regression.
    pub fn num_labels(&self) -> usize {
        match &self.table {
            Table::Classes { vocabulary, .. } => vocabulary.len(),
            Table::Values { width, .. } => *width,
        }
    }

    /// The amount of labelled samples.
    pub fn len(&self) -> usize {
        match &self.table {
            Table::Classes { samples, .. } => samples.len(),
            Table::Values { samples, .. } => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the label vector of the sample at `path`, looked up by file name.
    ///
    /// Classification labels are multi-hot over the vocabulary.
    pub fn label_for(&self, path: &Path) -> Option<Vec<f32>> {
        let name = path.file_name()?.to_str()?;

        match &self.table {
            Table::Classes {
                vocabulary,
                samples,
            } => {
                let labels = samples.get(name)?;
                let hot = vocabulary
                    .iter()
                    .map(|label| if labels.contains(label) { 1.0 } else { 0.0 })
                    .collect();
                Some(hot)
            }
            Table::Values { samples, .. } => samples.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const CLASSES: &str = "\
a.png,cat
b.png, dog ,cat

c.png,bird
";

    #[test]
    fn classification_is_multi_hot_over_first_seen_vocabulary() {
        let labels = LabelSource::parse(CLASSES, true).unwrap();

        assert_eq!(labels.num_labels(), 3);
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.label_for(Path::new("data/a.png")), Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(labels.label_for(Path::new("b.png")), Some(vec![1.0, 1.0, 0.0]));
        assert_eq!(labels.label_for(Path::new("/x/y/c.png")), Some(vec![0.0, 0.0, 1.0]));
        assert_eq!(labels.label_for(Path::new("d.png")), None);
    }

    #[test]
    fn regression_reads_values() {
        let labels = LabelSource::parse("a.png,0.5,1\nb.png,2\n", false).unwrap();

        assert_eq!(labels.num_labels(), 2);
        assert_eq!(labels.label_for(&PathBuf::from("a.png")), Some(vec![0.5, 1.0]));
        assert_eq!(labels.label_for(&PathBuf::from("b.png")), Some(vec![2.0]));
    }

    #[test]
    fn rejects_short_lines() {
        let err = LabelSource::parse("a.png,cat\nb.png\n", true).unwrap_err();
        assert!(matches!(err, NodeError::Labels { line: 2, .. }));
    }

    #[test]
    fn rejects_non_numeric_regression_values() {
        let err = LabelSource::parse("a.png,cat\n", false).unwrap_err();
        assert!(matches!(err, NodeError::Labels { line: 1, msg } if msg.contains("'cat'")));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("csvfile.txt");
        fs::write(&path, CLASSES).unwrap();

        assert_eq!(LabelSource::load(&path, true).unwrap().num_labels(), 3);
        assert!(matches!(
            LabelSource::load(dir.path().join("missing.txt"), true),
            Err(NodeError::Io(_))
        ));
    }
}
