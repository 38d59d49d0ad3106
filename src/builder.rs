use std::{collections::HashMap, sync::Arc};

use crate::{
    conf::{Conf, ResultConf},
    functions::{ResultFunction, SchemaFunction},
    rules::Node,
    Error, FunctionRegistry, Result, Rules,
};

/// Compile a JSON configuration document into [`Rules`] using the built-in functions.
pub fn build_rules_tree(data: &[u8]) -> Result<Rules> {
    build_rules_tree_with(data, &FunctionRegistry::default())
}

/// Compile a JSON configuration document into [`Rules`], resolving function names in
/// `registry`.
pub fn build_rules_tree_with(data: &[u8], registry: &FunctionRegistry) -> Result<Rules> {
    let conf: Conf = serde_json::from_slice(data)?;
    compile(conf, registry)
}

/// Tree under construction. A node's level, and thus its schema function, is only known once
/// every rule has been inserted.
#[derive(Default)]
struct PendingNode {
    children: HashMap<String, PendingNode>,
    result: Option<Box<dyn ResultFunction>>,
}

pub(crate) fn compile(conf: Conf, registry: &FunctionRegistry) -> Result<Rules> {
    // One instance per level, shared by every branch at that depth.
    let levels = conf
        .schema
        .iter()
        .map(|schema| registry.new_schema_function(&schema.function, &schema.args))
        .collect::<Result<Vec<_>>>()?;

    let mut root = PendingNode::default();
    for (index, rule) in conf.rules.iter().enumerate() {
        if rule.conditions.len() != levels.len() {
            return Err(Error::ConditionCountMismatch {
                rule: index,
                expected: levels.len(),
                actual: rule.conditions.len(),
            });
        }

        let result = first_result(index, &rule.results)?;
        let function = registry.new_result_function(&result.function, &result.args)?;

        let node = rule.conditions.iter().fold(&mut root, |node, condition| {
            node.children.entry(condition.clone()).or_default()
        });
        if node.result.replace(function).is_some() {
            log::warn!(target: "prebid_optimization",
                       rule = index,
                       conditions:debug = rule.conditions;
                       "rule overrides an earlier rule with the same conditions");
        }
    }

    let root = finish(root, &levels)?;
    log::debug!(target: "prebid_optimization",
                levels = levels.len(),
                rules = conf.rules.len(),
                leaves = root.leaf_count();
                "compiled optimization rules");
    Ok(Rules::new(root))
}

fn first_result(index: usize, results: &[ResultConf]) -> Result<&ResultConf> {
    match results {
        [] => Err(Error::MissingResult { rule: index }),
        [first] => Ok(first),
        [first, rest @ ..] => {
            log::warn!(target: "prebid_optimization",
                       rule = index,
                       ignored = rest.len();
                       "rule lists more than one result, only the first is applied");
            Ok(first)
        }
    }
}

fn finish(node: PendingNode, levels: &[Arc<dyn SchemaFunction>]) -> Result<Node> {
    match levels.split_first() {
        Some((function, rest)) => {
            let children = node
                .children
                .into_iter()
                .map(|(outcome, child)| finish(child, rest).map(|node| (outcome, node)))
                .collect::<Result<HashMap<_, _>>>()?;
            Ok(Node::Branch {
                function: Arc::clone(function),
                children,
            })
        }
        // Every inserted rule ends at this depth with a result, so only a configuration without
        // schema and rules gets here empty-handed.
        None => node
            .result
            .map(|function| Node::Leaf { function })
            .ok_or(Error::EmptyConfiguration),
    }
}
