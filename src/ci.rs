//! GitHub Actions workflow integration: step outputs and annotations.
use log::*;
use std::{
    env,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::Result;

/// Environment variable naming the file step outputs are appended to.
pub const OUTPUT_ENV_VAR: &str = "GITHUB_OUTPUT";

/// Publishes a step output for downstream workflow steps.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    match env::var_os(OUTPUT_ENV_VAR).map(PathBuf::from) {
        Some(path) => append_output(&path, name, value),
        None => {
            info!("{OUTPUT_ENV_VAR} not set: output {name}={value}");
            Ok(())
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    debug!("writing output {name} to {}", path.display());
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{name}={value}")?;
    Ok(())
}

/// Formats an error as a workflow `::error::` command.
pub fn error_annotation(message: &str) -> String {
    // annotations are single line
    let escaped = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{escaped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn appends_outputs_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output");
        fs::write(&path, "existing=1\n").unwrap();

        append_output(&path, "organization", "acme").unwrap();
        append_output(&path, "tag", "v1.0.0").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "existing=1\norganization=acme\ntag=v1.0.0\n"
        );
    }

    #[test]
    fn formats_error_annotation() {
        assert_eq!(error_annotation("boom"), "::error::boom");
        assert_eq!(
            error_annotation("line one\nline two 100%"),
            "::error::line one%0Aline two 100%25"
        );
    }
}
