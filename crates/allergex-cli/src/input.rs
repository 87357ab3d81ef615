//! Where texts come from.
//!
//! File input is normalized line by line with [`remove_literals`] before it
//! reaches the engine; interactive input is passed through untouched. The two
//! paths therefore produce different offsets for the same sentence.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clap::ValueEnum;
use regex::Regex;
use tracing::{debug, info};

use crate::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputMode {
    /// Read a .txt file, one text per line
    File,
    /// Read a single line from the terminal
    Cli,
}

/// Check the arguments for `mode` and return the file path when one is needed.
pub fn verify(mode: InputMode, path: Option<&Path>) -> Result<Option<PathBuf>> {
    match mode {
        InputMode::Cli => Ok(None),
        InputMode::File => {
            let path = path.ok_or(CliError::MissingPath)?;
            let is_txt = path.extension().is_some_and(|ext| ext == "txt");
            if !is_txt || !path.is_file() {
                return Err(CliError::InvalidPath(path.to_path_buf()));
            }
            Ok(Some(path.to_path_buf()))
        }
    }
}

fn quoted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["'].*?["']"#).unwrap())
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(\.\d+)?\b").unwrap())
}

fn punctuation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s]").unwrap())
}

/// Strip quoted literals, numbers and punctuation, then trim.
pub fn remove_literals(line: &str) -> String {
    let line = quoted_regex().replace_all(line, "");
    let line = number_regex().replace_all(&line, "");
    let line = punctuation_regex().replace_all(&line, "");
    line.trim().to_string()
}

/// Read every line of `path`, normalized.
pub fn read_file(path: &Path) -> Result<Vec<String>> {
    info!("File mode was set");
    let content = std::fs::read_to_string(path)?;
    let texts: Vec<String> = content.lines().map(remove_literals).collect();
    info!("File read: {} lines", texts.len());
    debug!(?texts);
    Ok(texts)
}

/// Prompt once and read a single line, unmodified apart from the newline.
pub fn read_interactive<R: BufRead, W: Write>(mut reader: R, mut prompt: W) -> Result<Vec<String>> {
    info!("CLI mode was set, listening to user input");
    writeln!(prompt, "==== Listening User Input ====")?;
    write!(prompt, "Your Input: ")?;
    prompt.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let line = line.trim_end_matches(['\n', '\r']).to_string();
    debug!(user_input = %line);
    Ok(vec![line])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn test_remove_literals() {
        assert_eq!(
            remove_literals("The \"red\" maple tree, aged 12.5 years, sheds pollen!\n"),
            "The  maple tree aged  years sheds pollen"
        );
        assert_eq!(remove_literals("birch's pollen"), "birchs pollen");
        // the apostrophe in "it's" opens the first quoted literal
        assert_eq!(remove_literals("it's 'quoted' here"), "itquoted here");
        assert_eq!(remove_literals("   "), "");
    }

    #[test]
    fn test_verify_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("input.txt");
        std::fs::write(&txt, "maple tree pollen").unwrap();
        let md = dir.path().join("input.md");
        std::fs::write(&md, "maple tree pollen").unwrap();

        assert_eq!(verify(InputMode::File, Some(&txt)).unwrap(), Some(txt.clone()));
        assert!(matches!(verify(InputMode::File, Some(&md)), Err(CliError::InvalidPath(_))));
        assert!(matches!(
            verify(InputMode::File, Some(&dir.path().join("missing.txt"))),
            Err(CliError::InvalidPath(_))
        ));
        assert!(matches!(verify(InputMode::File, None), Err(CliError::MissingPath)));
        assert_eq!(verify(InputMode::Cli, None).unwrap(), None);
    }

    #[test]
    fn test_read_file_normalizes_each_line() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "The maple tree, in 2024, released pollen.").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Birch \"catkins\" shed pollen!").unwrap();

        let texts = read_file(file.path()).unwrap();
        assert_eq!(
            texts,
            vec![
                "The maple tree in  released pollen".to_string(),
                String::new(),
                "Birch  shed pollen".to_string(),
            ]
        );
    }

    #[test]
    fn test_read_interactive_keeps_punctuation() {
        let mut prompt = Vec::new();
        let texts = read_interactive("The maple tree, 2024: pollen!\r\n".as_bytes(), &mut prompt).unwrap();
        assert_eq!(texts, vec!["The maple tree, 2024: pollen!".to_string()]);
        assert!(String::from_utf8(prompt).unwrap().ends_with("Your Input: "));
    }
}
