//! Shell completion generation for roomstat
//!
//! Scripts come from clap_complete. The bash script is extended so that
//! `--students` and `--rooms` complete `.json` files only.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;

use crate::cli::CliArgs;

const BIN_NAME: &str = "roomstat";

/// Write the completion script for `shell` to `out`
pub fn generate_completion(shell: Shell, out: &mut dyn Write) {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, BIN_NAME, &mut buffer);

    let script = String::from_utf8_lossy(&buffer);
    let script = match shell {
        Shell::Bash => format!("{}{}", script, BASH_DATASET_COMPLETION),
        _ => script.into_owned(),
    };

    if let Err(e) = out.write_all(script.as_bytes()) {
        tracing::warn!("Failed to write completion script: {}", e);
    }
}

const BASH_DATASET_COMPLETION: &str = r#"
# Complete dataset arguments with JSON files only
_roomstat_enhanced() {
    local cur prev words cword
    _init_completion || return

    if [[ "$prev" == "--students" || "$prev" == "--rooms" ]]; then
        _filedir json
        return 0
    fi

    _roomstat "$@"
}

complete -F _roomstat_enhanced -o bashdefault -o default roomstat
"#;
