use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use automaton_logic::{Classic, Submission};

/// Prefix selecting a built-in strategy instead of a file, e.g. `classic:tit-for-tat`.
pub const CLASSIC_PREFIX: &str = "classic:";

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = output_path else {
            return Ok(Output::Stdout {
                writer: io::stdout().lock(),
            });
        };
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn target(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.target()))?;
        writeln!(&mut *self)
            .and_then(|()| self.flush())
            .with_context(|| format!("Failed to write to {}", self.target()))?;
        tracing::debug!(output = %self.target(), "wrote JSON");
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn read_json<T>(path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Looks up a classic strategy by name, ignoring case, `-` and `_`.
pub fn parse_classic(name: &str) -> anyhow::Result<Classic> {
    let wanted: String = name
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_lowercase();
    Classic::ALL
        .into_iter()
        .find(|c| format!("{:?}", c).to_lowercase() == wanted)
        .with_context(|| format!("Unknown classic strategy: {}", name))
}

/// Builds a submission from a strategy file or a `classic:` reference.
///
/// Without `initial_state` the strategy starts in the state declared on its
/// first non-blank line.
pub fn load_submission(strategy: &str, initial_state: Option<&str>) -> anyhow::Result<Submission> {
    let (name, automaton) = match strategy.strip_prefix(CLASSIC_PREFIX) {
        Some(classic) => {
            let classic = parse_classic(classic)?;
            (classic.name().to_string(), classic.source().to_string())
        }
        None => (strategy.to_string(), read_text(Path::new(strategy))?),
    };

    let initial_state = match initial_state {
        Some(state) => state.to_string(),
        None => first_declared_state(&automaton)
            .with_context(|| format!("Strategy {} declares no state", name))?,
    };

    Ok(Submission {
        player: name.clone(),
        name,
        automaton,
        initial_state,
        motivation: String::new(),
    })
}

fn first_declared_state(automaton: &str) -> Option<String> {
    automaton
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.split_once(':'))
        .map(|(state, _)| state.trim().to_string())
}
