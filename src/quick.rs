//! Create a card from human-readable board and list names.

use crate::card::{Card, Position, TriState};
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::rest::RestContext;
use crate::time::parse_timestamp;
use tracing::{error, info};

/// Input for [`create_card`]. Absent board or list names come from the
/// stored profile.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub board_name: Option<String>,
    pub list_name: Option<String>,
    pub name: String,
    pub desc: Option<String>,
    /// Due date as typed by the user
    pub due: Option<String>,
    pub due_complete: Option<bool>,
    pub position: Option<String>,
}

/// Resolve the target list, remember it, then create the card.
///
/// A failed list lookup aborts before any create request is sent and
/// before the profile is overwritten.
pub async fn create_card(
    ctx: &RestContext,
    store: &dyn ProfileStore,
    new_card: NewCard,
) -> Result<Card> {
    let due = new_card.due.as_deref().map(parse_timestamp).transpose()?;
    let pos = new_card
        .position
        .as_deref()
        .map(str::parse::<Position>)
        .transpose()?;
    let profile = store.fill(new_card.board_name, new_card.list_name)?;

    let id_list = match ctx
        .resolve_list_id(&profile.board_name, &profile.list_name)
        .await
    {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "error occurred fetching the id of the specified list");
            return Err(e);
        }
    };
    store.save(&profile)?;

    let mut card = Card::for_list(id_list);
    card.name = Some(new_card.name);
    card.desc = new_card.desc;
    card.due = due;
    card.due_complete = TriState::from(new_card.due_complete);
    card.pos = pos;

    if let Err(e) = card.create(ctx).await {
        error!(error = %e, "error creating card");
        return Err(e);
    }

    info!(card_id = ?card.card_id(), list = %profile.list_name, "successfully created card");
    Ok(card)
}
