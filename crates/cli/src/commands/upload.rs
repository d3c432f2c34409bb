//! Upload endpoint command

use anyhow::Context;

use smokecheck_e2e::{UploadProbe, UploadReport};

use super::{upload_passed, write_report, Settings};
use crate::output::{self, OutputFormat};

/// Send the fixture upload and return the report without printing
pub async fn probe(settings: &Settings) -> anyhow::Result<UploadReport> {
    UploadProbe::new(settings.upload.clone())
        .run()
        .await
        .with_context(|| {
            format!(
                "Failed to prepare {}",
                settings.upload.image_path.display()
            )
        })
}

/// Run the upload check and print its outcome lines
pub async fn execute(settings: &Settings) -> anyhow::Result<bool> {
    let report = probe(settings).await?;

    match settings.format {
        OutputFormat::Json => output::print_json(&report),
        _ => {
            for line in report.lines() {
                println!("{}", line);
            }
        }
    }
    if let Some(path) = &settings.report {
        write_report(path, &report)?;
    }

    Ok(upload_passed(&report, settings.strict))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_endpoint(dir: &tempfile::TempDir, strict: bool) -> Settings {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut settings = Settings::default();
        settings.upload.endpoint = format!("http://127.0.0.1:{}/api/upload", port);
        settings.upload.image_path = dir.path().join("test_image.png");
        settings.strict = strict;
        settings
    }

    #[tokio::test]
    async fn test_failed_upload_passes_without_strict() {
        let dir = tempfile::tempdir().unwrap();
        let settings = unreachable_endpoint(&dir, false);

        assert!(execute(&settings).await.unwrap());
        assert!(dir.path().join("test_image.png").is_file());
    }

    #[tokio::test]
    async fn test_failed_upload_fails_with_strict() {
        let dir = tempfile::tempdir().unwrap();
        let settings = unreachable_endpoint(&dir, true);

        assert!(!execute(&settings).await.unwrap());
    }
}
