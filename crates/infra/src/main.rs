//! Runs a command script from stdin against an in-memory allocation service.
//!
//! Each command is handled in its own unit of work; a failing line is
//! reported and the script carries on.

use std::io::BufRead;
use std::sync::Arc;

use allocation_events::Dispatched;
use allocation_infra::script::parse_line;
use allocation_infra::{
    AllocationBus, AllocationConfig, InMemoryProductStore, InMemoryUnitOfWork, LogNotifications,
    bootstrap,
};

fn main() -> anyhow::Result<()> {
    allocation_observability::init();

    let config = AllocationConfig::from_env()?;
    let bus: AllocationBus<InMemoryUnitOfWork> = bootstrap(&config, Arc::new(LogNotifications))?;
    let store = Arc::new(InMemoryProductStore::new());

    for (idx, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;

        let message = match parse_line(&line) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(line = line_no, error = %err, "skipping unparsable line");
                println!("{line_no}: error: {err}");
                continue;
            }
        };

        let mut uow = InMemoryUnitOfWork::new(store.clone());
        match bus.handle(message, &mut uow) {
            Ok(Dispatched::Command(Some(reference))) => {
                println!("{line_no}: allocated to {reference}")
            }
            Ok(_) => println!("{line_no}: ok"),
            Err(err) => println!("{line_no}: error: {err}"),
        }
    }

    Ok(())
}
