use serde::{Deserialize, Serialize};

/// Declarative optimization configuration.
///
/// `schema` lists one discriminant function per tree level; each rule walks those levels with
/// its `conditions` (same order) and ends in a single result function.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conf {
    #[serde(default)]
    pub schema: Vec<Schema>,
    #[serde(default, alias = "rule")]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub conditions: Vec<String>,
    #[serde(default)]
    pub results: Vec<ResultConf>,
}

/// Terminal action for a rule. `args` is kept as raw JSON; each result function parses its own
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultConf {
    pub function: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::BufReader};

    use super::Conf;

    #[test]
    fn parse_default_configuration() {
        let f = File::open("tests/data/rules/default.json")
            .expect("Failed to open tests/data/rules/default.json");
        let conf: Conf = serde_json::from_reader(BufReader::new(f)).unwrap();

        assert_eq!(conf.schema.len(), 3);
        assert_eq!(conf.schema[0].function, "deviceCountry");
        assert_eq!(conf.schema[0].args, vec!["USA".to_owned()]);
        assert!(conf
            .rules
            .iter()
            .all(|rule| rule.conditions.len() == conf.schema.len()));
    }

    #[test]
    fn accepts_rule_alias_and_missing_args() {
        let conf: Conf = serde_json::from_str(
            r#"
              {
                "schema": [{"function": "channel"}],
                "rule": [
                  {
                    "conditions": ["amp"],
                    "results": [{"function": "setDeviceIP", "args": {"ip": "127.0.0.1"}}]
                  }
                ]
              }
            "#,
        )
        .unwrap();

        assert!(conf.schema[0].args.is_empty());
        assert_eq!(conf.rules.len(), 1);
        assert_eq!(conf.rules[0].results[0].args["ip"], "127.0.0.1");
    }

    #[test]
    fn rejects_non_string_schema_args() {
        let result = serde_json::from_str::<Conf>(
            r#"{"schema": [{"function": "deviceCountry", "args": [1, 2]}], "rules": []}"#,
        );
        assert!(result.is_err());
    }
}
