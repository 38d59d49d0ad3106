//! Name-keyed constructors for schema and result functions.
//!
//! The registry keeps two disjoint namespaces. Schema constructors receive the flat string
//! arguments of a `schema` entry; result constructors receive the raw JSON `args` of a rule's
//! result. Hosts can register their own functions next to the built-ins.

use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    functions::{
        result::{ExcludeBidders, SetDeviceIp},
        schema::{Channel, DataCenters, DeviceCity, DeviceCountry, DeviceRegion},
        ResultFunction, SchemaFunction,
    },
    Error, Result,
};

type SchemaFactory = Box<dyn Fn(&[String]) -> Result<Arc<dyn SchemaFunction>> + Send + Sync>;
type ResultFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn ResultFunction>> + Send + Sync>;

pub struct FunctionRegistry {
    schema: HashMap<String, SchemaFactory>,
    result: HashMap<String, ResultFactory>,
}

impl FunctionRegistry {
    /// Create a registry with no functions registered.
    pub fn new() -> Self {
        Self {
            schema: HashMap::new(),
            result: HashMap::new(),
        }
    }

    /// Register a schema function constructor, replacing any previous one with the same name.
    pub fn register_schema<F, T>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&[String]) -> Result<T> + Send + Sync + 'static,
        T: SchemaFunction + 'static,
    {
        self.schema.insert(
            name.into(),
            Box::new(move |args: &[String]| {
                Ok(Arc::new(constructor(args)?) as Arc<dyn SchemaFunction>)
            }),
        );
        self
    }

    /// Register a result function constructor, replacing any previous one with the same name.
    pub fn register_result<F, T>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&serde_json::Value) -> Result<T> + Send + Sync + 'static,
        T: ResultFunction + 'static,
    {
        self.result.insert(
            name.into(),
            Box::new(move |args: &serde_json::Value| {
                Ok(Box::new(constructor(args)?) as Box<dyn ResultFunction>)
            }),
        );
        self
    }

    pub fn new_schema_function(
        &self,
        name: &str,
        args: &[String],
    ) -> Result<Arc<dyn SchemaFunction>> {
        let factory = self
            .schema
            .get(name)
            .ok_or_else(|| Error::UnknownSchemaFunction(name.to_owned()))?;
        factory(args)
    }

    pub fn new_result_function(
        &self,
        name: &str,
        args: &serde_json::Value,
    ) -> Result<Box<dyn ResultFunction>> {
        let factory = self
            .result
            .get(name)
            .ok_or_else(|| Error::UnknownResultFunction(name.to_owned()))?;
        factory(args)
    }

    /// Registered schema function names, sorted.
    pub fn schema_functions(&self) -> Vec<&str> {
        sorted_names(self.schema.keys())
    }

    /// Registered result function names, sorted.
    pub fn result_functions(&self) -> Vec<&str> {
        sorted_names(self.result.keys())
    }
}

fn sorted_names<'a>(keys: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut names: Vec<&str> = keys.map(String::as_str).collect();
    names.sort_unstable();
    names
}

impl Default for FunctionRegistry {
    /// Registry with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .register_schema(DeviceCountry::NAME, DeviceCountry::new)
            .register_schema(DeviceRegion::NAME, DeviceRegion::new)
            .register_schema(DeviceCity::NAME, DeviceCity::new)
            .register_schema(DataCenters::NAME, DataCenters::new)
            .register_schema(Channel::NAME, Channel::new)
            .register_result(SetDeviceIp::NAME, SetDeviceIp::new)
            .register_result(ExcludeBidders::NAME, ExcludeBidders::new);
        registry
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("schema", &self.schema_functions())
            .field("result", &self.result_functions())
            .finish()
    }
}

/// Construct a built-in schema function by name.
pub fn new_schema_function_factory(
    name: &str,
    args: &[String],
) -> Result<Arc<dyn SchemaFunction>> {
    FunctionRegistry::default().new_schema_function(name, args)
}

/// Construct a built-in result function by name.
pub fn new_result_function_factory(
    name: &str,
    args: &serde_json::Value,
) -> Result<Box<dyn ResultFunction>> {
    FunctionRegistry::default().new_result_function(name, args)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        functions::{SchemaFunction, OUTCOME_WILDCARD},
        Error, RequestWrapper, Result,
    };

    use super::{new_result_function_factory, new_schema_function_factory, FunctionRegistry};

    #[derive(Debug)]
    struct Constant(String);

    impl SchemaFunction for Constant {
        fn call(&self, _request: &RequestWrapper) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn lists_builtin_functions() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.schema_functions(),
            vec![
                "channel",
                "dataCenters",
                "deviceCity",
                "deviceCountry",
                "deviceRegion"
            ]
        );
        assert_eq!(
            registry.result_functions(),
            vec!["excludeBidders", "setDeviceIP"]
        );
        assert!(FunctionRegistry::new().schema_functions().is_empty());
    }

    #[test]
    fn unknown_names_are_errors() {
        assert!(matches!(
            new_schema_function_factory("deviceOs", &[]),
            Err(Error::UnknownSchemaFunction(name)) if name == "deviceOs"
        ));
        assert!(matches!(
            new_result_function_factory("dropRequest", &json!({})),
            Err(Error::UnknownResultFunction(name)) if name == "dropRequest"
        ));
    }

    #[test]
    fn namespaces_are_disjoint() {
        assert!(matches!(
            new_schema_function_factory("setDeviceIP", &["127.0.0.1".to_owned()]),
            Err(Error::UnknownSchemaFunction(_))
        ));
        assert!(matches!(
            new_result_function_factory("channel", &json!(null)),
            Err(Error::UnknownResultFunction(_))
        ));
    }

    #[test]
    fn constructs_builtins() {
        let channel = new_schema_function_factory("channel", &[]).unwrap();
        assert_eq!(
            channel.call(&RequestWrapper::default()).unwrap(),
            OUTCOME_WILDCARD
        );

        let mut request = RequestWrapper::default();
        new_result_function_factory("excludeBidders", &json!({"bidders": ["bidderB"]}))
            .unwrap()
            .apply(&mut request)
            .unwrap();
        assert!(request.is_bidder_excluded("bidderB"));
    }

    #[test]
    fn argument_errors_surface_from_factory() {
        assert!(matches!(
            new_schema_function_factory("deviceCountry", &[]),
            Err(Error::InvalidFunctionArgs { .. })
        ));
    }

    #[test]
    fn custom_functions_can_be_registered() {
        let mut registry = FunctionRegistry::default();
        registry.register_schema("constant", |args: &[String]| {
            Ok(Constant(args.first().cloned().unwrap_or_default()))
        });

        let f = registry
            .new_schema_function("constant", &["gold".to_owned()])
            .unwrap();
        assert_eq!(f.call(&RequestWrapper::default()).unwrap(), "gold");
        assert!(registry.schema_functions().contains(&"constant"));
    }
}
