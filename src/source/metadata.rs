use crate::error::SourceError;
use crate::schema::RunInfo;
use std::fs;
use std::path::Path;

/// Read the run metadata document and resolve its paths against the
/// directory the document lives in.
pub fn read_run_info(path: &Path) -> Result<RunInfo, SourceError> {
    let text = fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut info: RunInfo = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
        path: path.display().to_string(),
        line: source.line(),
        source,
    })?;

    if let Some(base) = path.parent() {
        info.output = base.join(&info.output);
        info.result_info = info.result_info.map(|p| base.join(p));
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_paths_relative_to_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let run = dir.path().join("run.json");
        fs::write(
            &run,
            r#"{"run_id": 1, "output": "out.jsonl", "result_info": "info.json", "windows": []}"#,
        )
        .unwrap();

        let info = read_run_info(&run).unwrap();
        assert_eq!(info.output, dir.path().join("out.jsonl"));
        assert_eq!(info.result_info, Some(dir.path().join("info.json")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_run_info(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
