//! Question catalog loading.
//!
//! The catalog's job is enumeration, not interpretation: beyond the two
//! recognized file formats, no validation happens here. A script reference
//! that points nowhere surfaces later as that question's failed outcome.

use std::path::Path;

use serde::Deserialize;

use crate::errors::SetupError;
use crate::model::Question;

/// Tabular rows carry `tags` as a single comma-separated cell.
#[derive(Debug, Deserialize)]
struct CsvRow {
    question_id: String,
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    script_path: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonCatalog {
    #[serde(default)]
    questions: Vec<Question>,
}

/// Load questions from a `.csv` or `.json` catalog, preserving file order.
pub fn load(path: &Path) -> Result<Vec<Question>, SetupError> {
    if !path.exists() {
        return Err(SetupError::CatalogNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(SetupError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Question>, SetupError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| SetupError::CatalogCsv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut questions = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row.map_err(|source| SetupError::CatalogCsv {
            path: path.to_path_buf(),
            source,
        })?;
        questions.push(Question {
            question_id: row.question_id,
            question_text: row.question_text,
            script_path: row.script_path,
            difficulty: row.difficulty,
            category: row.category,
            tags: split_tags(row.tags.as_deref()),
        });
    }
    Ok(questions)
}

fn load_json(path: &Path) -> Result<Vec<Question>, SetupError> {
    let raw = std::fs::read_to_string(path)?;
    let catalog: JsonCatalog =
        serde_json::from_str(&raw).map_err(|source| SetupError::CatalogJson {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(catalog.questions)
}

fn split_tags(cell: Option<&str>) -> Vec<String> {
    cell.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_in_file_order_and_splits_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "questions.csv",
            "question_id,question_text,script_path,difficulty,category,tags\n\
             Q002,\"Count walls, all storeys\",scripts/001_count_walls.py,easy,quantity,\"walls, counting\"\n\
             Q001,How tall is the building?,scripts/005_building_height.py,medium,geometry,\n",
        );

        let questions = load(&path).unwrap();
        assert_eq!(questions.len(), 2);
        // File order is preserved; sorting happens at aggregation.
        assert_eq!(questions[0].question_id, "Q002");
        assert_eq!(questions[0].question_text, "Count walls, all storeys");
        assert_eq!(questions[0].tags, vec!["walls", "counting"]);
        assert_eq!(questions[1].question_id, "Q001");
        assert!(questions[1].tags.is_empty());
    }

    #[test]
    fn loads_json_questions_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "questions.json",
            r#"{
                "questions": [
                    {
                        "question_id": "Q001",
                        "question_text": "How many walls?",
                        "script_path": "scripts/001_count_walls.py",
                        "difficulty": "easy",
                        "tags": ["walls"]
                    }
                ]
            }"#,
        );

        let questions = load(&path).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_id, "Q001");
        assert_eq!(questions[0].tags, vec!["walls"]);
    }

    #[test]
    fn missing_catalog_is_a_setup_error() {
        let err = load(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, SetupError::CatalogNotFound(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_any_scheduling() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "questions.yaml", "questions: []\n");
        let err = load(&path).unwrap_err();
        match err {
            SetupError::UnsupportedFormat { extension, .. } => assert_eq!(extension, "yaml"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn rows_with_missing_optional_columns_still_enumerate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bare.csv",
            "question_id,question_text,script_path\nQ001,How many walls?,scripts/001_count_walls.py\n",
        );
        let questions = load(&path).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].difficulty, "");
        assert_eq!(questions[0].category, None);
    }
}
