use std::path::PathBuf;

use anyhow::anyhow;
use automaton_logic::{ForbiddenStrategies, StrategyGraph, ValidationPolicy};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GraphArg {
    /// Strategy file, or `classic:<name>` for a built-in strategy
    strategy: String,
    /// Initial state (defaults to the state on the first line)
    #[arg(long)]
    initial_state: Option<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GraphArg) -> anyhow::Result<()> {
    let GraphArg {
        strategy,
        initial_state,
        output,
    } = arg;

    let submission = util::load_submission(strategy, initial_state.as_deref())?;
    let accepted = submission
        .accept(&ValidationPolicy::lenient(), &ForbiddenStrategies::default())
        .map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            anyhow!("Invalid strategy {}: {}", submission.name, messages.join(" "))
        })?;

    let graph = StrategyGraph::from_machine(&accepted.entrant.machine);
    tracing::info!(
        strategy = %submission.name,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "built strategy graph"
    );
    Output::save_json(&graph, output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_of_classic() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("graph.json");
        let arg = GraphArg {
            strategy: "classic:always-defect".to_string(),
            initial_state: None,
            output: Some(output.clone()),
        };
        run(&arg).unwrap();

        let graph: serde_json::Value = util::read_json(&output).unwrap();
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 1);
        assert_eq!(graph["edges"][0]["label"], "C/D");
    }

    #[test]
    fn test_incomplete_strategy_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = dir.path().join("broken.txt");
        std::fs::write(&strategy, "a: C, a, b\n").unwrap();
        let arg = GraphArg {
            strategy: strategy.to_str().unwrap().to_string(),
            ..GraphArg::default()
        };
        assert!(run(&arg).is_err());
    }
}
