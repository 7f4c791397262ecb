use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{ImportResolver, SourceFormatter};
use crate::error::{MirrorError, Result};

/// Placeholder replaced by the destination file's directory in tool arguments
pub const DIR_PLACEHOLDER: &str = "{dir}";

/// An external stdin-to-stdout tool such as `gofmt` or `goimports`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTool {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExternalTool {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Build from a `[program, args...]` command line
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn run(&self, source: &[u8], dir: Option<&Path>) -> std::result::Result<Vec<u8>, String> {
        let dir_text = dir.map(|d| d.to_string_lossy().into_owned()).unwrap_or_default();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(DIR_PLACEHOLDER, &dir_text))
            .collect();

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| format!("failed to start {}: {err}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source)
                .map_err(|err| format!("failed to feed {}: {err}", self.program))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| format!("failed to wait for {}: {err}", self.program))?;
        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(output.stdout)
    }
}

impl SourceFormatter for ExternalTool {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>> {
        self.run(source, None).map_err(|reason| MirrorError::Format {
            file: "<generated>".to_string(),
            reason,
        })
    }
}

impl ImportResolver for ExternalTool {
    fn resolve_imports(&self, path: &Path, source: &[u8]) -> Result<Vec<u8>> {
        self.run(source, path.parent())
            .map_err(|reason| MirrorError::ResolveImports {
                path: path.to_path_buf(),
                reason,
            })
    }
}
