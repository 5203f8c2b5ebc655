//! chiptally: chip tracking for Texas Hold'em and Zhajinhua home games
//!
//! Physical cards stay on the table; this crate keeps the authoritative chip
//! state. It validates turns, moves chips between stacks and pots, builds side
//! pots and pays out the winners the host selects.
//!
//! Goals:
//! - Every operation is a pure `(&Table, request) -> Result<Table, TableError>` step
//! - Rejected requests never change state
//! - Concurrent clients are serialized by the store and detected by a concurrency token
//!
//! ## Quick start
//! ```
//! use chiptally::action::{Action, ActionRequest, Expected};
//! use chiptally::rules::GameRules;
//! use chiptally::service::TableService;
//! use chiptally::table::{Identity, Table, TableId};
//!
//! let service = TableService::default();
//! let host = Identity::from("host");
//! let mut table = Table::new("t1", GameRules::texas(), Some(host.clone()));
//! table.seat("p1", "Ann", Some("ann".into())).unwrap();
//! table.seat("p2", "Bo", Some("bo".into())).unwrap();
//! service.create_table(table).unwrap();
//!
//! let id = TableId::from("t1");
//! let live = service.start(&host, &id).unwrap();
//! // heads-up: the small blind acts first
//! let req =
//!     ActionRequest { table_id: id.clone(), action: Action::Call, expected: Expected::of(&live) };
//! let after = service.act(&"bo".into(), &req).unwrap();
//! assert_eq!(after.seats[1].bet, 20);
//! ```
//!
//! ## Simulation
//! ```sh
//! RUST_LOG=chiptally=debug,audit=info cargo run --bin chiptally-sim -- zhajinhua 20
//! ```

pub mod action;
pub mod agents;
pub mod audit;
pub mod chips;
pub mod clock;
pub mod engine;
pub mod error;
pub mod pot;
pub mod rules;
pub mod service;
pub mod settlement;
pub mod store;
pub mod table;
pub mod texas;
pub mod zhajinhua;

pub use error::{ErrorFamily, TableError, TableResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
