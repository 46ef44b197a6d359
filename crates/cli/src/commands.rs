//! Commands the demo binary can execute against a [`LoadBalancer`].
//!
//! This is purely a driver: it has no bearing on the placement invariant,
//! only on observing and reporting it.

use anyhow::{Context, Result};
use clap::Subcommand;
use corelib::{LoadBalancer, ServerId};

/// One operation against the load balancer, either parsed from the command
/// line or from a line of a script file.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a new server and migrate in its share of existing keys.
    AddServer { id: u32 },
    /// Remove a server, migrating its keys to the ring successor first.
    RemoveServer { id: u32 },
    /// Store a key/value pair.
    Store { key: String, value: String },
    /// Look up a key; prints the value (or a miss) and the owning server.
    Retrieve { key: String },
}

pub type CommandResult = Result<()>;

impl Command {
    pub fn execute(&self, lb: &mut LoadBalancer) -> CommandResult {
        match self {
            Command::AddServer { id } => {
                lb.add_server(ServerId(*id)).with_context(|| format!("adding server {id}"))?;
                println!("server {id} added");
            }
            Command::RemoveServer { id } => {
                // Unknown id is a programmer error per the design: it
                // terminates the process (panic) rather than returning Err.
                lb.remove_server(ServerId(*id));
                println!("server {id} removed");
            }
            Command::Store { key, value } => {
                // Empty ring is a programmer error per the design: it
                // terminates the process (panic) rather than returning Err.
                let id = lb.store(key, value);
                println!("stored {key:?} on server {id}");
            }
            Command::Retrieve { key } => {
                let (value, id) = lb.retrieve(key);
                match value {
                    Some(v) => println!("{key:?} = {v:?} (server {id})"),
                    None => println!("{key:?} not found (would be served by server {id})"),
                }
            }
        }
        Ok(())
    }
}
