//! Example processing routine registered for the `example` kind.
//!
//! Stands in for real business logic: every item is echoed back tagged with
//! `processed: true` and a processing timestamp.

use lambda_starter_core::clock::iso_timestamp;
use lambda_starter_core::context::ExecutionContext;
use lambda_starter_core::contract::{CanonicalEvent, FIELD_DATA};
use lambda_starter_core::error::HandlerError;
use rayon::prelude::*;
use serde_json::{json, Map, Value};

pub fn handle_example_event(
    event: &CanonicalEvent,
    _context: &ExecutionContext,
) -> Result<Value, HandlerError> {
    let data = event
        .data()
        .ok_or(HandlerError::MissingInput { field: FIELD_DATA })?;
    process_data(data)
}

/// Lists are processed item by item on the rayon pool; results keep the
/// input order. Any other value is processed as a single item.
pub fn process_data(data: &Value) -> Result<Value, HandlerError> {
    match data {
        Value::Null => Err(HandlerError::MissingInput { field: FIELD_DATA }),
        Value::Array(items) => {
            let processed_items: Vec<Value> = items.par_iter().map(process_item).collect();
            Ok(json!({
                "processedItems": processed_items,
                "totalItems": items.len(),
            }))
        }
        item => Ok(json!({
            "processedItem": process_item(item),
            "timestamp": iso_timestamp(),
        })),
    }
}

/// Object items keep all their fields; scalars are wrapped under `value`.
pub fn process_item(item: &Value) -> Value {
    let mut fields = match item {
        Value::Object(fields) => fields.clone(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert("value".to_string(), other.clone());
            wrapped
        }
    };
    fields.insert("processed".to_string(), Value::Bool(true));
    fields.insert(
        "processingTimestamp".to_string(),
        Value::String(iso_timestamp()),
    );
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_is_rejected() {
        let context = ExecutionContext::local();

        for event in [json!({"type": "example"}), json!({"type": "example", "data": null})] {
            let error = handle_example_event(&CanonicalEvent::new(event), &context)
                .expect_err("data is required");
            assert!(matches!(error, HandlerError::MissingInput { field: "data" }));
        }
    }

    #[test]
    fn list_items_are_tagged_in_input_order() {
        let items: Vec<Value> = (0..50)
            .map(|index| json!({"id": index, "name": format!("item-{index}")}))
            .collect();
        let event = CanonicalEvent::new(json!({"type": "example", "data": items}));

        let result = handle_example_event(&event, &ExecutionContext::local())
            .expect("list should process");

        assert_eq!(result["totalItems"], 50);
        let processed = result["processedItems"].as_array().expect("list result");
        assert_eq!(processed.len(), 50);
        for (index, item) in processed.iter().enumerate() {
            assert_eq!(item["id"], index);
            assert_eq!(item["name"], format!("item-{index}"));
            assert_eq!(item["processed"], true);
            assert!(item["processingTimestamp"].is_string());
        }
    }

    #[test]
    fn empty_list_yields_zero_items() {
        let result = process_data(&json!([])).expect("empty list is valid input");

        assert_eq!(result, json!({"processedItems": [], "totalItems": 0}));
    }

    #[test]
    fn single_object_gets_top_level_timestamp() {
        let result = process_data(&json!({"orderId": "A-1", "amount": 12.5}))
            .expect("single item should process");

        let item = &result["processedItem"];
        assert_eq!(item["orderId"], "A-1");
        assert_eq!(item["amount"], 12.5);
        assert_eq!(item["processed"], true);
        assert!(result["timestamp"].is_string());
    }

    #[test]
    fn scalar_items_are_wrapped() {
        let result = process_data(&json!(["a", 2])).expect("scalars should process");

        assert_eq!(result["processedItems"][0]["value"], "a");
        assert_eq!(result["processedItems"][1]["value"], 2);
        assert_eq!(result["processedItems"][1]["processed"], true);
    }
}
