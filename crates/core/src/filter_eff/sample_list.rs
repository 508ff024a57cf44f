//! Signal sample lists (`SampleLists/SignalMC_<era>.txt`).

use std::path::Path;

use super::error::FilterEffError;

/// Datasets listed in `content`, one per line. Blank lines and `#` comments
/// are skipped.
pub fn parse_sample_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn read_sample_list(path: &Path) -> Result<Vec<String>, FilterEffError> {
    if !path.exists() {
        return Err(FilterEffError::SampleListNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_sample_list(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "# 2017 signal\n\n  /A/B/MINIAODSIM  \n#/C/D/MINIAODSIM\n/E/F/MINIAODSIM\n";
        assert_eq!(
            parse_sample_list(content),
            vec!["/A/B/MINIAODSIM", "/E/F/MINIAODSIM"]
        );
    }

    #[tokio::test]
    async fn test_read_missing_list() {
        let dir = TempDir::new().unwrap();
        let err = read_sample_list(&dir.path().join("SignalMC_2017.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, FilterEffError::SampleListNotFound { .. }));
    }

    #[tokio::test]
    async fn test_read_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SignalMC_2018.txt");
        std::fs::write(&path, "/A/B/MINIAODSIM\n").unwrap();
        assert_eq!(read_sample_list(&path).await.unwrap(), vec!["/A/B/MINIAODSIM"]);
    }
}
