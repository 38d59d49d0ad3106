use std::{collections::HashMap, fs::File, io::BufReader, path::Path, sync::Arc};

use crate::{
    builder::{build_rules_tree, compile},
    functions::{ResultFunction, SchemaFunction},
    FunctionRegistry, RequestWrapper, Result,
};

/// A vertex of the rule tree.
///
/// Branches classify the request and follow the child keyed by the outcome. Leaves terminate a
/// path and apply their result function.
#[derive(Debug)]
pub enum Node {
    Branch {
        function: Arc<dyn SchemaFunction>,
        children: HashMap<String, Node>,
    },
    Leaf {
        function: Box<dyn ResultFunction>,
    },
}

impl Node {
    /// Evaluate this node and its matching descendants, returning the final outcome.
    ///
    /// The outcome of a leaf is the empty string. When a branch outcome has no matching child,
    /// evaluation stops and that outcome is returned without applying any result.
    pub fn process_node(&self, request: &mut RequestWrapper) -> Result<String> {
        match self {
            Node::Leaf { function } => {
                function.apply(request)?;
                Ok(String::new())
            }
            Node::Branch { function, children } => {
                let outcome = function.call(request)?;
                match children.get(&outcome) {
                    Some(child) => child.process_node(request),
                    None => {
                        log::trace!(target: "prebid_optimization",
                                    function:debug = function,
                                    outcome:display = outcome;
                                    "no rule matches outcome");
                        Ok(outcome)
                    }
                }
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn child(&self, outcome: &str) -> Option<&Node> {
        match self {
            Node::Branch { children, .. } => children.get(outcome),
            Node::Leaf { .. } => None,
        }
    }

    /// Number of branch levels on the longest path below this node.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Branch { children, .. } => {
                1 + children.values().map(Node::depth).max().unwrap_or(0)
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Branch { children, .. } => children.values().map(Node::leaf_count).sum(),
        }
    }
}

/// Compiled, immutable rule tree.
///
/// A single instance is meant to be shared across concurrent requests; each evaluation mutates
/// only the request it is given.
#[derive(Debug)]
pub struct Rules {
    root: Node,
}

impl Rules {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Compile rules from a JSON configuration document using the built-in functions.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        build_rules_tree(data)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let conf = serde_json::from_reader(reader)?;
        compile(conf, &FunctionRegistry::default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Apply the rule matching `request`, if any.
    pub fn execute(&self, request: &mut RequestWrapper) -> Result<()> {
        self.evaluate(request).map(|_| ())
    }

    /// Same as [`Rules::execute`], returning the final outcome.
    pub fn evaluate(&self, request: &mut RequestWrapper) -> Result<String> {
        self.root.process_node(request)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use crate::{
        functions::{ResultFunction, SchemaFunction},
        request::{BidRequest, Device, Geo},
        Error, RequestWrapper, Result,
    };

    use super::{Node, Rules};

    /// Schema function that returns a fixed outcome.
    #[derive(Debug)]
    pub(crate) struct Fixed(pub &'static str);

    impl SchemaFunction for Fixed {
        fn call(&self, _request: &RequestWrapper) -> Result<String> {
            Ok(self.0.to_owned())
        }
    }

    #[derive(Debug)]
    pub(crate) struct Failing;

    impl SchemaFunction for Failing {
        fn call(&self, _request: &RequestWrapper) -> Result<String> {
            Err(Error::FunctionCall {
                function: "failing".into(),
                reason: "boom".into(),
            })
        }
    }

    /// Result function counting its invocations and tagging the request with its name.
    #[derive(Debug, Clone)]
    pub(crate) struct Counting {
        pub name: &'static str,
        pub calls: Arc<AtomicUsize>,
    }

    impl Counting {
        pub(crate) fn new(name: &'static str) -> Self {
            Self {
                name,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ResultFunction for Counting {
        fn apply(&self, request: &mut RequestWrapper) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.exclude_bidder(self.name);
            Ok(())
        }
    }

    pub(crate) fn branch(
        function: impl SchemaFunction + 'static,
        children: Vec<(&str, Node)>,
    ) -> Node {
        Node::Branch {
            function: Arc::new(function),
            children: children
                .into_iter()
                .map(|(outcome, node)| (outcome.to_owned(), node))
                .collect::<HashMap<_, _>>(),
        }
    }

    pub(crate) fn leaf(function: &Counting) -> Node {
        Node::Leaf {
            function: Box::new(function.clone()),
        }
    }

    pub(crate) fn usa_request() -> RequestWrapper {
        RequestWrapper::new(BidRequest {
            device: Some(Device {
                ip: None,
                geo: Some(Geo {
                    country: Some("USA".into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn follows_matching_path() {
        let a = Counting::new("a");
        let b = Counting::new("b");
        let rules = Rules::new(branch(
            Fixed("x"),
            vec![
                ("x", branch(Fixed("y"), vec![("y", leaf(&a)), ("z", leaf(&b))])),
                ("w", leaf(&b)),
            ],
        ));
        let mut request = RequestWrapper::default();

        assert_eq!(rules.evaluate(&mut request).unwrap(), "");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
        assert!(request.is_bidder_excluded("a"));
    }

    #[test]
    fn no_match_stops_without_mutation() {
        let a = Counting::new("a");
        let rules = Rules::new(branch(
            Fixed("x"),
            vec![("x", branch(Fixed("unmatched"), vec![("y", leaf(&a))]))],
        ));
        let mut request = usa_request();
        let before = request.clone();

        assert_eq!(rules.evaluate(&mut request).unwrap(), "unmatched");
        assert_eq!(a.calls(), 0);
        assert_eq!(request, before);
    }

    #[test]
    fn errors_abort_traversal() {
        let a = Counting::new("a");
        let rules = Rules::new(branch(
            Fixed("x"),
            vec![("x", branch(Failing, vec![("y", leaf(&a))]))],
        ));

        let result = rules.execute(&mut RequestWrapper::default());
        assert!(matches!(result, Err(Error::FunctionCall { .. })));
        assert_eq!(a.calls(), 0);
    }

    #[test]
    fn single_leaf_tree_always_applies() {
        let a = Counting::new("a");
        let rules = Rules::new(leaf(&a));

        rules.execute(&mut RequestWrapper::default()).unwrap();
        assert_eq!(a.calls(), 1);
        assert_eq!(rules.depth(), 0);
        assert_eq!(rules.leaf_count(), 1);
    }

    #[test]
    fn repeated_execution_is_deterministic() {
        let rules = Rules::from_file("tests/data/rules/default.json").unwrap();
        let mut first = usa_request().with_data_center("eu-central");
        first.bid_request.site = Some(Default::default());
        let mut second = first.clone();

        let outcome_first = rules.evaluate(&mut first).unwrap();
        let outcome_second = rules.evaluate(&mut second).unwrap();

        assert_eq!(outcome_first, outcome_second);
        assert_eq!(first, second);
    }

    #[test]
    fn shape_of_default_tree() {
        let rules = Rules::from_file("tests/data/rules/default.json").unwrap();
        assert_eq!(rules.depth(), 3);
        assert_eq!(rules.leaf_count(), 3);
        assert!(rules
            .root()
            .child("true")
            .and_then(|n| n.child("true"))
            .and_then(|n| n.child("amp"))
            .is_some_and(Node::is_leaf));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Rules::from_file("tests/data/rules/missing.json"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn shared_across_threads() {
        let rules = Arc::new(Rules::from_file("tests/data/rules/two_branch.json").unwrap());

        let handles: Vec<_> = ["USA", "FRA"]
            .into_iter()
            .map(|country| {
                let rules = Arc::clone(&rules);
                std::thread::spawn(move || {
                    let mut request = usa_request();
                    if let Some(geo) = request
                        .bid_request
                        .device
                        .as_mut()
                        .and_then(|d| d.geo.as_mut())
                    {
                        geo.country = Some(country.to_owned());
                    }
                    rules.execute(&mut request).unwrap();
                    request.device_ip().map(str::to_owned)
                })
            })
            .collect();

        let ips: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            ips,
            vec![Some("127.0.0.1".to_owned()), Some("127.0.0.2".to_owned())]
        );
    }
}
