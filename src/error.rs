use thiserror::Error;

/// Failures at the sink boundary. Projection itself never fails.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{tool} not found in PATH. Install Graphviz (https://graphviz.org/download/) or point --tool at it")]
    ToolNotFound { tool: String },

    #[error("{tool} found but returned error code {}", display_code(.code))]
    ToolUnusable { tool: String, code: Option<i32> },

    #[error("The command \"{command}\" failed with error code {}", display_code(.code))]
    RenderFailed { command: String, code: Option<i32> },

    #[error("Ubigraph call {method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
