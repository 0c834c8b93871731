//! Вывод реестра операций

use std::collections::BTreeMap;

use anyhow::Result;
use sealkit::operation::{Operation, OperationTraits};

pub fn run(operation: Option<Operation>) -> Result<()> {
    let json = match operation {
        Some(op) => serde_json::to_string_pretty(&op.traits())?,
        None => {
            let table: BTreeMap<&str, OperationTraits> =
                Operation::ALL.iter().map(|op| (op.name(), op.traits())).collect();
            serde_json::to_string_pretty(&table)?
        }
    };

    println!("{}", json);
    Ok(())
}
