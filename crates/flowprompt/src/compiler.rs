//! Flowchart to prompt compilation.
//!
//! The compiler turns a node and edge snapshot into a line-based description
//! of the control flow with three sections:
//!
//! ```text
//! ## Declarations        (only when there are orphan blocks)
//! - "Orphan text"
//!
//! ## Legend
//! - START : ...
//! ...
//!
//! ## Logic
//! [1] START
//!     → [2]
//! [2] IF ("Ready?"):
//!     CASE ('yes') → [3]
//!     CASE (no condition) → [4]
//! [3] ACTION: "Ship it"
//! [4] END
//! ```
//!
//! Block numbers come from [`FlowGraph::numbering`]. The output is a pure
//! function of the snapshot, so compiling the same flowchart twice yields
//! identical text.

use log::{debug, info};

use flowprompt_core::model::{Edge, Node, NodeShape};

use crate::{
    config::Language,
    error::FlowError,
    graph::{FlowGraph, Numbering},
};

/// Fixed wording of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    declarations_heading: &'static str,
    legend_heading: &'static str,
    legend: [&'static str; 6],
    logic_heading: &'static str,
    no_condition: &'static str,
}

impl Vocabulary {
    pub const ENGLISH: Vocabulary = Vocabulary {
        declarations_heading: "## Declarations",
        legend_heading: "## Legend",
        legend: [
            "- START : entry point",
            "- END : exit point (the flow ends here even mid-chart)",
            "- ACTION : an action or output",
            "- IF : conditional branch",
            "- CASE : one branch of a condition",
            "- → [n] : number of the next block",
        ],
        logic_heading: "## Logic",
        no_condition: "no condition",
    };

    pub const KOREAN: Vocabulary = Vocabulary {
        declarations_heading: "## 선언",
        legend_heading: "## 기호 설명",
        legend: [
            "- START : 시작 지점",
            "- END : 종료 지점 (중간에 나와도 해당 흐름은 종료됨)",
            "- ACTION : 동작이나 출력",
            "- IF : 조건 분기",
            "- CASE : 조건의 갈래",
            "- → [n] : 다음으로 이동할 블럭 번호",
        ],
        logic_heading: "## 로직",
        no_condition: "(조건 없음)",
    };

    pub fn for_language(language: Language) -> &'static Vocabulary {
        match language {
            Language::English => &Self::ENGLISH,
            Language::Korean => &Self::KOREAN,
        }
    }
}

/// Compiles flowcharts into prompt text.
///
/// # Examples
///
/// ```
/// use flowprompt::{compiler::PromptCompiler, config::Language, store::DiagramStore};
/// use flowprompt_core::{
///     model::{Anchor, Endpoint, NodeShape},
///     text::FixedAdvance,
/// };
///
/// let mut store = DiagramStore::new().with_text_measure(Box::new(FixedAdvance::new(8.0)));
/// let start = store.create_default_node(NodeShape::Start).unwrap().id();
/// let end = store.create_default_node(NodeShape::End).unwrap().id();
/// store
///     .create_edge(Endpoint::new(start, Anchor::Bottom), Endpoint::new(end, Anchor::Top))
///     .unwrap();
///
/// let prompt = PromptCompiler::new(Language::English)
///     .compile(store.nodes(), store.edges())
///     .unwrap();
/// assert!(prompt.ends_with("## Logic\n[1] START\n    → [2]\n[2] END"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptCompiler {
    vocabulary: &'static Vocabulary,
}

impl Default for PromptCompiler {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl PromptCompiler {
    pub fn new(language: Language) -> Self {
        Self {
            vocabulary: Vocabulary::for_language(language),
        }
    }

    /// Produces the prompt text for a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::EmptyGraph`] when there are no nodes and
    /// [`FlowError::DanglingReference`] when an edge points at a missing node.
    pub fn compile(&self, nodes: &[Node], edges: &[Edge]) -> Result<String, FlowError> {
        if nodes.is_empty() {
            return Err(FlowError::EmptyGraph);
        }
        info!(nodes = nodes.len(), edges = edges.len(); "Compiling prompt");

        let graph = FlowGraph::new(nodes, edges)?;
        let numbering = graph.numbering();
        let vocabulary = self.vocabulary;
        let mut lines: Vec<String> = Vec::new();

        let orphans: Vec<&Node> = graph.orphans().collect();
        if !orphans.is_empty() {
            lines.push(vocabulary.declarations_heading.to_string());
            lines.extend(
                orphans
                    .iter()
                    .map(|node| format!("- \"{}\"", node.flat_text())),
            );
            lines.push(String::new());
        }
        debug!(orphans = orphans.len(); "Declarations emitted");

        lines.push(vocabulary.legend_heading.to_string());
        lines.extend(vocabulary.legend.iter().map(|line| line.to_string()));
        lines.push(String::new());

        lines.push(vocabulary.logic_heading.to_string());
        for &id in numbering.in_order() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            if graph.is_orphan(node) {
                continue;
            }
            self.emit_node(&mut lines, &graph, &numbering, node);
        }

        Ok(lines.join("\n").trim().to_string())
    }

    fn emit_node(
        &self,
        lines: &mut Vec<String>,
        graph: &FlowGraph,
        numbering: &Numbering,
        node: &Node,
    ) {
        let number = display_number(numbering, node);
        let outgoing = graph.outgoing(node.id());
        let target = |edge: &Edge| target_number(numbering, edge);

        match node.shape() {
            NodeShape::Start => {
                lines.push(format!("[{number}] START"));
                lines.extend(
                    outgoing
                        .iter()
                        .map(|&edge| format!("    → [{}]", target(edge))),
                );
            }
            NodeShape::End => lines.push(format!("[{number}] END")),
            _ if outgoing.len() > 1 => {
                lines.push(format!("[{number}] IF (\"{}\"):", node.flat_text()));
                for &edge in outgoing {
                    let label = if edge.text().is_empty() {
                        self.vocabulary.no_condition.to_string()
                    } else {
                        format!("'{}'", edge.text())
                    };
                    lines.push(format!("    CASE ({label}) → [{}]", target(edge)));
                }
            }
            _ => {
                lines.push(format!("[{number}] ACTION: \"{}\"", node.flat_text()));
                if let &[edge] = outgoing {
                    lines.push(format!("    → [{}]", target(edge)));
                }
            }
        }
    }
}

fn display_number(numbering: &Numbering, node: &Node) -> String {
    number_or_placeholder(numbering.number(node.id()))
}

fn target_number(numbering: &Numbering, edge: &Edge) -> String {
    number_or_placeholder(numbering.number(edge.target().node))
}

fn number_or_placeholder(number: Option<usize>) -> String {
    number.map_or_else(|| "?".to_string(), |n| n.to_string())
}
