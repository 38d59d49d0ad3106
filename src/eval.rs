use crate::{rules::Node, RequestWrapper, Result, Rules};

/// Iterative counterpart of [`Rules::evaluate`].
///
/// Walks the tree with an explicit cursor instead of recursion. Both evaluators apply the same
/// mutation and return the same outcome for any tree and request.
pub fn execute_flat(rules: &Rules, request: &mut RequestWrapper) -> Result<String> {
    let mut curr_node = rules.root();
    loop {
        match curr_node {
            Node::Leaf { function } => {
                function.apply(request)?;
                return Ok(String::new());
            }
            Node::Branch { function, children } => {
                let outcome = function.call(request)?;
                match children.get(&outcome) {
                    Some(child) => curr_node = child,
                    // Stop here: re-evaluating the same node would never pick another edge.
                    None => {
                        log::trace!(target: "prebid_optimization",
                                    outcome:display = outcome;
                                    "no rule matches outcome");
                        return Ok(outcome);
                    }
                }
            }
        }
    }
}
