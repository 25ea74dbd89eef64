use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a parameter file and deserialise into a typed struct.
/// YAML is used for `.yaml`/`.yml` extensions, JSON otherwise.
pub fn read_params<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let is_yaml = canonical
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let value: T = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };
    Ok(value)
}

/// Resolve and validate the path.
fn resolve_path(path: &str) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use project_finance_core::model::ProjectParameters;

    fn demo_path(name: &str) -> String {
        format!("{}/../../demos/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn test_demo_json_parses_and_validates() {
        let params: ProjectParameters = read_params(&demo_path("station.json")).unwrap();
        assert!(params.validate().is_ok());
        assert_eq!(params.financing.tranches.len(), 2);
    }

    #[test]
    fn test_demo_yaml_matches_json() {
        let from_json: ProjectParameters = read_params(&demo_path("station.json")).unwrap();
        let from_yaml: ProjectParameters = read_params(&demo_path("station.yaml")).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_missing_file_reported() {
        let result: Result<ProjectParameters, _> = read_params("no-such-file.json");
        assert!(result.is_err());
    }
}
