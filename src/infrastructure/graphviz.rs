//! Graphviz output sinks.
//!
//! - `GraphvizSourceSink`: writes the generated DOT document.
//! - `GraphvizImageSink`: feeds the document to `dot` (or a compatible tool)
//!   and produces an image.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::domain::projection::GraphProjector;
use crate::error::RenderError;
use crate::ports::{OutputSink, StatisticsSource};

pub const DEFAULT_SOURCE_FILE: &str = "callviz.dot";
pub const DEFAULT_IMAGE_FILE: &str = "callviz.png";

// ═══════════════════════════════════════════════════════════════════════════
// DOT source output
// ═══════════════════════════════════════════════════════════════════════════

pub struct GraphvizSourceSink {
    projector: GraphProjector,
    output_file: PathBuf,
}

impl GraphvizSourceSink {
    pub fn new(projector: GraphProjector, output_file: impl Into<PathBuf>) -> Self {
        Self {
            projector,
            output_file: output_file.into(),
        }
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

impl OutputSink for GraphvizSourceSink {
    fn done(&mut self, source: &dyn StatisticsSource) -> Result<(), RenderError> {
        let document = self.projector.generate(source);
        fs::write(&self.output_file, &document)?;
        info!(
            path = %self.output_file.display(),
            bytes = document.len(),
            "graphviz source written"
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Image output
// ═══════════════════════════════════════════════════════════════════════════

pub struct GraphvizImageSink {
    projector: GraphProjector,
    tool: String,
    image_format: String,
    output_file: PathBuf,
    temp_dir: Option<PathBuf>,
}

impl GraphvizImageSink {
    pub fn new(
        projector: GraphProjector,
        tool: &str,
        image_format: &str,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            projector,
            tool: tool.to_string(),
            image_format: image_format.to_string(),
            output_file: output_file.into(),
            temp_dir: None,
        }
    }

    /// Place the transient DOT input in `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Render `document` through the external tool.
    ///
    /// The transient input file is removed when this returns, whether the
    /// tool succeeded or not.
    pub fn render(&self, document: &str) -> Result<(), RenderError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("callviz-").suffix(".dot");
        let mut input = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        input.write_all(document.as_bytes())?;
        input.flush()?;

        let spec = build_render_command(&self.tool, &self.image_format, &self.output_file, input.path());
        debug!(command = %spec, "running renderer");

        let status = match Command::new(&spec.program).args(&spec.args).status() {
            Ok(status) => status,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RenderError::ToolNotFound { tool: self.tool.clone() });
            }
            Err(e) => return Err(e.into()),
        };

        if !status.success() {
            return Err(RenderError::RenderFailed {
                command: spec.to_string(),
                code: status.code(),
            });
        }

        info!(
            path = %self.output_file.display(),
            format = %self.image_format,
            "graphviz image rendered"
        );
        Ok(())
    }
}

impl OutputSink for GraphvizImageSink {
    fn sanity_check(&self) -> Result<(), RenderError> {
        check_tool_available(&self.tool)
    }

    fn done(&mut self, source: &dyn StatisticsSource) -> Result<(), RenderError> {
        let document = self.projector.generate(source);
        self.render(&document)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tool discovery and command building
// ═══════════════════════════════════════════════════════════════════════════

/// Check that the layout tool can be executed.
pub fn check_tool_available(tool: &str) -> Result<(), RenderError> {
    match Command::new(tool).arg("-V").output() {
        Ok(output) if output.status.success() => {
            // Graphviz prints its version on stderr.
            let version = String::from_utf8_lossy(&output.stderr);
            debug!(tool, version = %version.trim(), "layout tool available");
            Ok(())
        }
        Ok(output) => Err(RenderError::ToolUnusable {
            tool: tool.to_string(),
            code: output.status.code(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(RenderError::ToolNotFound { tool: tool.to_string() }),
        Err(e) => Err(e.into()),
    }
}

/// Describes the renderer invocation without running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// `<tool> -T<format> -o<output> <input>`
pub fn build_render_command(tool: &str, format: &str, output: &Path, input: &Path) -> CommandSpec {
    CommandSpec {
        program: tool.to_string(),
        args: vec![
            format!("-T{}", format),
            format!("-o{}", output.display()),
            input.display().to_string(),
        ],
    }
}
