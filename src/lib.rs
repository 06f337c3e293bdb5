//! # trello-cards - card client for the Trello REST API
//!
//! Create, update and delete cards and read or write their custom fields.
//! Boards, lists and custom fields are addressed by name; the crate
//! resolves names to IDs and remembers custom-field IDs per board.
//!
//! ## Features
//!
//! - Name to ID resolution with exact, unambiguous matching
//! - Query-parameter encoding of the populated card fields
//! - Custom field reads and writes (`text`, `checked`, `date`, `number`)
//! - A single error type for local preconditions, lookups and HTTP failures
//! - Pluggable [`Transport`] for testing without a network
//!
//! ## Basic Usage
//!
//! ```no_run
//! use trello_cards::{Card, Credentials, Position, RestContext};
//!
//! # async fn run() -> trello_cards::Result<()> {
//! let ctx = RestContext::new(Credentials::new("api-key", "api-token"))?;
//!
//! let id_list = ctx.resolve_list_id("Projects", "Homework").await?;
//! let mut card = Card::for_list(id_list);
//! card.name = Some("Read chapter 3".to_string());
//! card.pos = Some(Position::Top);
//! card.create(&ctx).await?;
//!
//! card.set_custom_field_by_name(&ctx, "Points", "42", "number").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Credentials
//!
//! ```no_run
//! use trello_cards::{EnvCredentials, RestContext};
//!
//! // reads TRELLO_API_KEY and TRELLO_API_TOKEN
//! let ctx = RestContext::from_source(&EnvCredentials)?;
//! # Ok::<(), trello_cards::BoardError>(())
//! ```

pub mod card;
pub mod client;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod profile;
pub mod query;
pub mod quick;
pub mod resolve;
pub mod rest;
pub mod time;
pub mod transport;

// Re-export main types for convenience
pub use card::{Card, CustomFieldType, Position, TriState};
pub use client::Config;
pub use credentials::{CredentialSource, Credentials, EnvCredentials};
pub use error::{BoardError, LookupStep, Result};
pub use profile::{JsonProfileStore, Profile, ProfileStore};
pub use query::{encode, FieldValue, QueryFields};
pub use quick::{create_card, NewCard};
pub use resolve::{associate_by, CustomFieldCache};
pub use rest::RestContext;
pub use transport::{HttpTransport, RestResponse, Transport};
