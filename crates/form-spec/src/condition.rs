use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Literal compared against a field value. Numbers interpolate unquoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Number(value) => write!(f, "{}", value),
            ConditionValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<f64> for ConditionValue {
    fn from(value: f64) -> Self {
        ConditionValue::Number(value)
    }
}

/// Comparison operator of a single condition.
///
/// Unrecognized operators deserialize to `Other` and compile with `equals`
/// semantics; an authoring typo degrades instead of failing the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    #[serde(other)]
    Other,
}

/// A single `field <op> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalLogic {
    pub field: String,
    pub value: ConditionValue,
    #[serde(default)]
    pub operator: ConditionOperator,
}

/// Combinator applied across a whole condition list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    And,
    Or,
}

impl GroupOperator {
    fn joiner(&self) -> &'static str {
        match self {
            GroupOperator::And => " and ",
            GroupOperator::Or => " or ",
        }
    }
}

/// Homogeneous AND/OR group. One combinator applies to the whole list; mixed
/// nesting is outside the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MultipleConditions {
    pub conditions: Vec<ConditionalLogic>,
    pub operator: GroupOperator,
}

/// Either shape accepted wherever a `conditional` appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Conditional {
    Group(MultipleConditions),
    Single(ConditionalLogic),
}

/// Compiles a conditional into the rendering engine's expression grammar.
///
/// Total and deterministic: every input yields a non-empty expression string.
/// The output is a wire contract with the engine's evaluator and must stay
/// byte-compatible with it.
pub fn compile_conditional(conditional: &Conditional) -> String {
    match conditional {
        Conditional::Single(condition) => compile_condition(condition),
        Conditional::Group(group) => group
            .conditions
            .iter()
            .map(compile_condition)
            .collect::<Vec<_>>()
            .join(group.operator.joiner()),
    }
}

/// Compiles one condition through the operator template table.
pub fn compile_condition(condition: &ConditionalLogic) -> String {
    let field = &condition.field;
    let value = &condition.value;
    match condition.operator {
        ConditionOperator::Equals | ConditionOperator::Other => {
            format!("{{{field}}} = {}", literal(value))
        }
        ConditionOperator::NotEquals => format!("{{{field}}} != {}", literal(value)),
        ConditionOperator::Contains => format!("{{{field}}} contains '{}'", escape_quotes(&value.to_string())),
        ConditionOperator::GreaterThan => format!("{{{field}}} > {value}"),
        ConditionOperator::LessThan => format!("{{{field}}} < {value}"),
        ConditionOperator::GreaterThanOrEqual => format!("{{{field}}} >= {value}"),
        ConditionOperator::LessThanOrEqual => format!("{{{field}}} <= {value}"),
    }
}

fn literal(value: &ConditionValue) -> String {
    match value {
        ConditionValue::Number(number) => number.to_string(),
        ConditionValue::Text(text) => format!("'{}'", escape_quotes(text)),
    }
}

fn escape_quotes(text: &str) -> String {
    text.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn single(field: &str, value: ConditionValue, operator: ConditionOperator) -> Conditional {
        Conditional::Single(ConditionalLogic {
            field: field.to_string(),
            value,
            operator,
        })
    }

    #[test]
    fn equals_quotes_text_values() {
        let cond = single("hasAllergies", "Yes".into(), ConditionOperator::Equals);
        assert_eq!(compile_conditional(&cond), "{hasAllergies} = 'Yes'");
    }

    #[test]
    fn equals_leaves_numbers_unquoted() {
        let cond = single("visits", 3.0.into(), ConditionOperator::Equals);
        assert_eq!(compile_conditional(&cond), "{visits} = 3");
    }

    #[test]
    fn not_equals_and_contains_templates() {
        let ne = single("state", "CA".into(), ConditionOperator::NotEquals);
        assert_eq!(compile_conditional(&ne), "{state} != 'CA'");
        let contains = single("symptoms", "pain".into(), ConditionOperator::Contains);
        assert_eq!(compile_conditional(&contains), "{symptoms} contains 'pain'");
    }

    #[test]
    fn ordering_operators_never_quote() {
        let gt = single("age", 18.0.into(), ConditionOperator::GreaterThan);
        assert_eq!(compile_conditional(&gt), "{age} > 18");
        let le = single("weight", 99.5.into(), ConditionOperator::LessThanOrEqual);
        assert_eq!(compile_conditional(&le), "{weight} <= 99.5");
    }

    #[test]
    fn unknown_operator_falls_back_to_equals() {
        let parsed: ConditionalLogic = serde_json::from_value(json!({
            "field": "mood",
            "value": "ok",
            "operator": "approximately"
        }))
        .expect("deserialize");
        assert_eq!(parsed.operator, ConditionOperator::Other);
        assert_eq!(compile_condition(&parsed), "{mood} = 'ok'");
    }

    #[test]
    fn missing_operator_defaults_to_equals() {
        let parsed: ConditionalLogic =
            serde_json::from_value(json!({ "field": "q", "value": "v" })).expect("deserialize");
        assert_eq!(parsed.operator, ConditionOperator::Equals);
    }

    #[test]
    fn group_joins_with_combinator() {
        let group = Conditional::Group(MultipleConditions {
            conditions: vec![
                ConditionalLogic {
                    field: "a".into(),
                    value: 1.0.into(),
                    operator: ConditionOperator::GreaterThan,
                },
                ConditionalLogic {
                    field: "b".into(),
                    value: "x".into(),
                    operator: ConditionOperator::Equals,
                },
            ],
            operator: GroupOperator::Or,
        });
        assert_eq!(compile_conditional(&group), "{a} > 1 or {b} = 'x'");
    }

    #[test]
    fn untagged_conditional_picks_group_when_conditions_present() {
        let parsed: Conditional = serde_json::from_value(json!({
            "conditions": [
                { "field": "a", "value": "1" },
                { "field": "b", "value": "2" }
            ],
            "operator": "and"
        }))
        .expect("deserialize");
        assert!(matches!(parsed, Conditional::Group(_)));
        assert_eq!(compile_conditional(&parsed), "{a} = '1' and {b} = '2'");
    }

    #[test]
    fn embedded_quotes_are_escaped() {
        // Regression for the quote-breaking limitation: O'Brien must not
        // terminate the literal early.
        let cond = single("lastName", "O'Brien".into(), ConditionOperator::Equals);
        assert_eq!(compile_conditional(&cond), "{lastName} = 'O\\'Brien'");
        let contains = single("notes", "can't".into(), ConditionOperator::Contains);
        assert_eq!(compile_conditional(&contains), "{notes} contains 'can\\'t'");
    }
}
