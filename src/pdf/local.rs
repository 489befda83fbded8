//! Convertors backed by a locally installed executable.
//!
//! HTML is piped to the tool's stdin and the PDF read from its stdout.
//! Attachments are written to a temporary directory for the duration of the
//! call, since both tools only attach files from disk.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::pdf::{Attachment, ConvertOptions, Convertor, PdfError};

/// Supported command line tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTool {
    Prince,
    WeasyPrint,
}

impl LocalTool {
    pub fn name(self) -> &'static str {
        match self {
            LocalTool::Prince => "prince",
            LocalTool::WeasyPrint => "weasyprint",
        }
    }

    fn default_program(self) -> &'static str {
        self.name()
    }

    /// Arguments reading HTML from stdin and writing PDF to stdout.
    pub fn args(self, attachments: &[PathBuf]) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match self {
            LocalTool::Prince => {
                for path in attachments {
                    let mut flag = OsString::from("--attach=");
                    flag.push(path);
                    args.push(flag);
                }
                args.extend(["-", "-o", "-"].map(OsString::from));
            }
            LocalTool::WeasyPrint => {
                for path in attachments {
                    args.push("--attachment".into());
                    args.push(path.into());
                }
                args.extend(["-", "-"].map(OsString::from));
            }
        }
        args
    }
}

/// Runs a local tool once per conversion.
#[derive(Debug, Clone)]
pub struct LocalConvertor {
    tool: LocalTool,
    program: String,
}

impl LocalConvertor {
    pub fn new(tool: LocalTool, executable: Option<String>) -> Self {
        let program = executable.unwrap_or_else(|| tool.default_program().to_string());
        Self { tool, program }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Keep only the final path component so attachments cannot escape the directory.
fn attachment_path(dir: &Path, attachment: &Attachment) -> PathBuf {
    let name = Path::new(&attachment.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("attachment"));
    dir.join(name)
}

#[async_trait]
impl Convertor for LocalConvertor {
    fn name(&self) -> &'static str {
        self.tool.name()
    }

    async fn html(
        &self,
        cancel: &CancellationToken,
        html: &[u8],
        opts: &ConvertOptions,
    ) -> Result<Vec<u8>, PdfError> {
        let dir = tempfile::tempdir()?;
        let mut paths = Vec::with_capacity(opts.attachments.len());
        for attachment in &opts.attachments {
            let path = attachment_path(dir.path(), attachment);
            tokio::fs::write(&path, &attachment.data).await?;
            paths.push(path);
        }

        let mut child = Command::new(&self.program)
            .args(self.tool.args(&paths))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PdfError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            let input = html.to_vec();
            tokio::spawn(async move {
                stdin.write_all(&input).await?;
                stdin.shutdown().await
            })
        });

        // Dropping the child on cancellation kills the process.
        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(PdfError::Cancelled),
            output = child.wait_with_output() => output?,
        };

        if let Some(writer) = writer {
            if let Ok(Err(e)) = writer.await {
                tracing::debug!(program = %self.program, error = %e, "Writing HTML to convertor failed");
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr)
            };
            return Err(PdfError::Process {
                program: self.program.clone(),
                detail,
            });
        }
        if output.stdout.is_empty() {
            return Err(PdfError::Process {
                program: self.program.clone(),
                detail: "produced no output".to_string(),
            });
        }

        tracing::debug!(
            program = %self.program,
            bytes = output.stdout.len(),
            attachments = paths.len(),
            "PDF generated"
        );
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prince_args() {
        let args = LocalTool::Prince.args(&[PathBuf::from("/tmp/x/gobl.json")]);
        assert_eq!(args, vec!["--attach=/tmp/x/gobl.json", "-", "-o", "-"]);
    }

    #[test]
    fn test_weasyprint_args() {
        let args = LocalTool::WeasyPrint.args(&[PathBuf::from("/tmp/x/gobl.json")]);
        assert_eq!(args, vec!["--attachment", "/tmp/x/gobl.json", "-", "-"]);
        assert_eq!(LocalTool::WeasyPrint.args(&[]), vec!["-", "-"]);
    }

    #[test]
    fn test_attachment_path_strips_directories() {
        let dir = Path::new("/tmp/work");
        let sneaky = Attachment::new("../../etc/passwd", b"x".to_vec());
        assert_eq!(attachment_path(dir, &sneaky), PathBuf::from("/tmp/work/passwd"));
        let plain = Attachment::new("gobl.json", b"{}".to_vec());
        assert_eq!(attachment_path(dir, &plain), PathBuf::from("/tmp/work/gobl.json"));
    }

    #[test]
    fn test_default_program() {
        assert_eq!(LocalConvertor::new(LocalTool::Prince, None).program(), "prince");
        assert_eq!(
            LocalConvertor::new(LocalTool::WeasyPrint, Some("/usr/local/bin/weasyprint".into()))
                .program(),
            "/usr/local/bin/weasyprint"
        );
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let convertor = LocalConvertor::new(
            LocalTool::Prince,
            Some("/nonexistent/definitely-not-prince".into()),
        );
        let err = convertor
            .html(&CancellationToken::new(), b"<p>hi</p>", &ConvertOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Spawn { .. }), "{}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_process() {
        let convertor = LocalConvertor::new(LocalTool::Prince, Some("false".into()));
        let err = convertor
            .html(&CancellationToken::new(), b"<p>hi</p>", &ConvertOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PdfError::Process { .. }), "{}", err);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output() {
        let convertor = LocalConvertor::new(LocalTool::WeasyPrint, Some("true".into()));
        let err = convertor
            .html(&CancellationToken::new(), b"<p>hi</p>", &ConvertOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("produced no output"), "{}", err);
    }
}
