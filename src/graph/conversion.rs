use super::definition::Graph;
use crate::error::GraphConversionError;

/// A trait for host data models that can be converted into a junro `Graph`.
///
/// This is the extension point that keeps the interpreter independent of any editor or
/// storage format. Implement it on your own document type to provide the translation
/// layer; [`WorkflowDocument`](crate::ui::WorkflowDocument) is the implementation for the
/// canvas JSON format.
///
/// # Example
///
/// ```rust
/// use junro::prelude::*;
/// use junro::error::GraphConversionError;
///
/// struct Checklist {
///     items: Vec<String>,
/// }
///
/// impl IntoGraph for Checklist {
///     fn into_graph(self) -> Result<Graph, GraphConversionError> {
///         let mut steps = vec![Step::new("start", StepKind::Entry)];
///         let mut transitions = Vec::new();
///         let mut previous = "start".to_string();
///         for (i, item) in self.items.into_iter().enumerate() {
///             let id = format!("item-{}", i);
///             steps.push(Step::new(&id, StepKind::log(item)));
///             transitions.push(Transition::new(&previous, &id));
///             previous = id;
///         }
///         steps.push(Step::new("end", StepKind::Terminal));
///         transitions.push(Transition::new(previous, "end"));
///         Ok(Graph::new(steps, transitions)?)
///     }
/// }
///
/// let graph = Checklist { items: vec!["check oil".into()] }.into_graph().unwrap();
/// assert_eq!(graph.steps().len(), 3);
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into an executable graph snapshot.
    fn into_graph(self) -> Result<Graph, GraphConversionError>;
}

impl IntoGraph for Graph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        Ok(self)
    }
}
