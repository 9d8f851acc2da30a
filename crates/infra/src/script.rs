//! Line-oriented command scripts for the `allocation` binary.
//!
//! One command per line; blank lines and `#` comments are skipped:
//!
//! ```text
//! batch <reference> <sku> <qty> [<eta YYYY-MM-DD>]
//! allocate <order-id> <sku> <qty>
//! change <reference> <qty>
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use allocation_core::{BatchRef, DomainError, OrderId, Sku};
use allocation_domain::{Allocate, AllocationMessage, ChangeBatchQuantity, CreateBatch};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command} expects {expected}, got {got} argument(s)")]
    Arity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid {field} {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Parse one script line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<AllocationMessage>, ScriptError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let message = match (command, args.as_slice()) {
        ("batch", [reference, sku, qty]) => AllocationMessage::command(CreateBatch {
            reference: BatchRef::new(*reference)?,
            sku: Sku::new(*sku)?,
            qty: quantity(qty)?,
            eta: None,
        }),
        ("batch", [reference, sku, qty, eta]) => AllocationMessage::command(CreateBatch {
            reference: BatchRef::new(*reference)?,
            sku: Sku::new(*sku)?,
            qty: quantity(qty)?,
            eta: Some(date(eta)?),
        }),
        ("batch", args) => return Err(arity("batch", "3 or 4", args.len())),
        ("allocate", [order_id, sku, qty]) => AllocationMessage::command(Allocate {
            order_id: OrderId::new(*order_id)?,
            sku: Sku::new(*sku)?,
            qty: quantity(qty)?,
        }),
        ("allocate", args) => return Err(arity("allocate", "3", args.len())),
        ("change", [reference, qty]) => AllocationMessage::command(ChangeBatchQuantity {
            reference: BatchRef::new(*reference)?,
            qty: quantity(qty)?,
        }),
        ("change", args) => return Err(arity("change", "2", args.len())),
        (other, _) => return Err(ScriptError::UnknownCommand(other.to_string())),
    };
    Ok(Some(message))
}

fn arity(command: &'static str, expected: &'static str, got: usize) -> ScriptError {
    ScriptError::Arity {
        command,
        expected,
        got,
    }
}

fn quantity(raw: &str) -> Result<u32, ScriptError> {
    raw.parse().map_err(|_| ScriptError::InvalidValue {
        field: "quantity",
        value: raw.to_string(),
    })
}

fn date(raw: &str) -> Result<NaiveDate, ScriptError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ScriptError::InvalidValue {
        field: "eta",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocation_domain::AllocationCommand;
    use allocation_events::Message;

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# restock").unwrap(), None);
    }

    #[test]
    fn parses_batches_with_and_without_eta() {
        let Some(Message::Command(AllocationCommand::CreateBatch(batch))) =
            parse_line("batch b1 RED-CHAIR 20 2026-05-01").unwrap()
        else {
            panic!("expected a CreateBatch command");
        };
        assert_eq!(batch.reference.as_str(), "b1");
        assert_eq!(batch.qty, 20);
        assert_eq!(batch.eta, NaiveDate::from_ymd_opt(2026, 5, 1));

        assert!(matches!(
            parse_line("batch b2 RED-CHAIR 5").unwrap(),
            Some(Message::Command(AllocationCommand::CreateBatch(CreateBatch { eta: None, .. })))
        ));
    }

    #[test]
    fn parses_allocate_and_change() {
        assert!(matches!(
            parse_line("allocate o1 RED-CHAIR 2").unwrap(),
            Some(Message::Command(AllocationCommand::Allocate(Allocate { qty: 2, .. })))
        ));
        assert!(matches!(
            parse_line("change b1 0").unwrap(),
            Some(Message::Command(AllocationCommand::ChangeBatchQuantity(
                ChangeBatchQuantity { qty: 0, .. }
            )))
        ));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            parse_line("ship b1").unwrap_err(),
            ScriptError::UnknownCommand("ship".to_string())
        );
        assert!(matches!(
            parse_line("allocate o1 RED-CHAIR").unwrap_err(),
            ScriptError::Arity { command: "allocate", got: 2, .. }
        ));
        assert!(matches!(
            parse_line("change b1 lots").unwrap_err(),
            ScriptError::InvalidValue { field: "quantity", .. }
        ));
        assert!(matches!(
            parse_line("batch b1 RED-CHAIR 5 soon").unwrap_err(),
            ScriptError::InvalidValue { field: "eta", .. }
        ));
    }
}
