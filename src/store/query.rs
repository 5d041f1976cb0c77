use serde_json::{json, Value};

/// Query predicates for document listing. Filters are ANDed together by the
/// store; ordering and limit ride in the same list. Serialized to the
/// provider's JSON wire form, e.g.
/// `{"method":"equal","attribute":"userId","values":["abc"]}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal { attribute: String, value: Value },
    GreaterThanEqual { attribute: String, value: Value },
    LessThanEqual { attribute: String, value: Value },
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
}

impl Query {
    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Equal { attribute: attribute.into(), value: value.into() }
    }

    pub fn greater_than_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::GreaterThanEqual { attribute: attribute.into(), value: value.into() }
    }

    pub fn less_than_equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::LessThanEqual { attribute: attribute.into(), value: value.into() }
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    pub fn to_wire(&self) -> String {
        let value = match self {
            Query::Equal { attribute, value } => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::GreaterThanEqual { attribute, value } => {
                json!({ "method": "greaterThanEqual", "attribute": attribute, "values": [value] })
            }
            Query::LessThanEqual { attribute, value } => {
                json!({ "method": "lessThanEqual", "attribute": attribute, "values": [value] })
            }
            Query::OrderAsc(attribute) => {
                json!({ "method": "orderAsc", "attribute": attribute })
            }
            Query::OrderDesc(attribute) => {
                json!({ "method": "orderDesc", "attribute": attribute })
            }
            Query::Limit(limit) => {
                json!({ "method": "limit", "values": [limit] })
            }
        };
        value.to_string()
    }
}
