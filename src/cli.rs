//! Minimal CLI: schema file(s) → AST JSON.
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;

use crate::ast::render_json;
use crate::link::link_document;
use crate::options::Options;
use crate::translate::translate_root;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// translate JSON Schema documents into a language-neutral type AST
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// link and translate, then print the AST as JSON
    Ast(AstOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// replace the ANY sentinel with UNKNOWN throughout
    #[arg(long, default_value_t = false)]
    unknown_any: bool,

    /// surface `definitions` entries as params of their parent interface
    #[arg(long, default_value_t = false)]
    unreachable_definitions: bool,
}

#[derive(Args, Debug, Clone)]
struct CommonSettings {
    /// Debugging: disable parallelization across input files
    #[arg(long)]
    no_parallel: bool,
}

#[derive(Args, Debug)]
struct AstOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    common_settings: CommonSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Options {
        Options {
            unknown_any: self.unknown_any,
            unreachable_definitions: self.unreachable_definitions,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Ast(target) => {
                let rendered = translate_inputs(&target.input_settings, &target.common_settings)?;
                let text = serde_json::to_string_pretty(&rendered)?;
                match target.out.as_ref() {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &text)
                            .with_context(|| format!("write {}", out.display()))?;
                    }
                    None => println!("{text}"),
                }
                Ok(())
            }
        }
    }
}

/// One independent translation per input file. A single input yields its
/// AST directly; several yield an object keyed by source path.
fn translate_inputs(input: &InputSettings, common: &CommonSettings) -> Result<Value> {
    let paths = resolve_file_path_patterns(&input.input)?;
    let options = input.options();

    let translate_one = |path: &PathBuf| -> Result<(String, Value)> {
        let path_str = path.to_string_lossy().to_string();
        let source = std::fs::read_to_string(path).with_context(|| format!("read {path_str}"))?;
        let doc: Value = serde_json::from_str(&source)
            .with_context(|| format!("parse JSON source file ({path_str})"))?;
        let mut linked = link_document(&doc).with_context(|| format!("link {path_str}"))?;
        let translation = translate_root(&mut linked, options)
            .with_context(|| format!("translate {path_str}"))?;
        Ok((path_str, render_json(&translation.asts, translation.root)))
    };

    let mut rendered: Vec<(String, Value)> = if common.no_parallel {
        paths.iter().map(translate_one).collect::<Result<_>>()?
    } else {
        paths.par_iter().map(translate_one).collect::<Result<_>>()?
    };

    if rendered.len() == 1 {
        let (_, single) = rendered.remove(0);
        Ok(single)
    } else {
        Ok(Value::Object(rendered.into_iter().collect()))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                return Err(anyhow!("glob pattern matched no files: {pattern}"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
