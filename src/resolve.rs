//! Name to ID resolution.
//!
//! Boards, lists and custom fields are addressed by opaque IDs; callers
//! know them by name. A lookup fetches the scoped collection and demands
//! exactly one object whose `name` equals the target.

use crate::endpoint;
use crate::error::{BoardError, LookupStep, Result};
use crate::rest::RestContext;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct NamedObject {
    id: String,
    name: String,
}

/// Process-wide `(boardID, fieldName) -> customFieldID` bindings.
///
/// Entries never expire. Two tasks missing on the same key at once both
/// resolve it and the second insert overwrites the first with the same ID.
#[derive(Debug, Default)]
pub struct CustomFieldCache {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl CustomFieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, String), String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, board_id: &str, field_name: &str) -> Option<String> {
        self.lock()
            .get(&(board_id.to_string(), field_name.to_string()))
            .cloned()
    }

    pub fn insert(&self, board_id: &str, field_name: &str, field_id: &str) {
        self.lock().insert(
            (board_id.to_string(), field_name.to_string()),
            field_id.to_string(),
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl RestContext {
    /// Resolve `target_name` to an ID within the collection at `template`.
    ///
    /// Matching is exact and case-sensitive. Zero matches is
    /// [`BoardError::NotFound`], more than one is [`BoardError::AmbiguousName`].
    pub async fn resolve_id(
        &self,
        template: &str,
        scope: &[(&str, &str)],
        target_name: &str,
    ) -> Result<String> {
        let url = self.endpoint(template, scope);
        let response = self.send(&url, Method::GET, None).await?;
        if !response.success {
            return Err(BoardError::LookupTransport {
                status: response.status,
                body: response.body,
            });
        }

        let objects: Vec<NamedObject> = response.json()?;
        let mut matches = objects.into_iter().filter(|o| o.name == target_name);
        match (matches.next(), matches.count()) {
            (None, _) => Err(BoardError::NotFound {
                name: target_name.to_string(),
            }),
            (Some(found), 0) => Ok(found.id),
            (Some(_), rest) => Err(BoardError::AmbiguousName {
                name: target_name.to_string(),
                count: rest + 1,
            }),
        }
    }

    /// Resolve a board among the caller's open boards
    pub async fn resolve_board_id(&self, board_name: &str) -> Result<String> {
        self.resolve_id(endpoint::OPEN_BOARDS, &[], board_name)
            .await
            .map_err(|e| e.in_step(LookupStep::Board))
    }

    /// Resolve a list by board name and list name.
    ///
    /// The board is resolved first; the list lookup is scoped to it.
    pub async fn resolve_list_id(&self, board_name: &str, list_name: &str) -> Result<String> {
        let board_id = self.resolve_board_id(board_name).await?;
        let list_id = self
            .resolve_id(endpoint::BOARD_LISTS, &[("boardID", board_id.as_str())], list_name)
            .await
            .map_err(|e| e.in_step(LookupStep::List))?;

        debug!(board = board_name, list = list_name, %list_id, "resolved list");
        Ok(list_id)
    }

    /// Resolve a custom field on a board, consulting the shared cache first
    pub async fn resolve_custom_field_id(&self, board_id: &str, field_name: &str) -> Result<String> {
        if let Some(id) = self.field_cache().get(board_id, field_name) {
            return Ok(id);
        }

        let id = self
            .resolve_id(
                endpoint::BOARD_CUSTOM_FIELDS,
                &[("boardID", board_id)],
                field_name,
            )
            .await
            .map_err(|e| e.in_step(LookupStep::CustomField))?;

        self.field_cache().insert(board_id, field_name, &id);
        Ok(id)
    }
}

/// Index a JSON array of objects by the string at `field`.
///
/// Fails on an object lacking the field or on two objects sharing a key.
pub fn associate_by(array: Vec<Value>, field: &str) -> Result<HashMap<String, Value>> {
    let mut associated = HashMap::with_capacity(array.len());
    for object in array {
        let key = object
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BoardError::MalformedResponse(format!("object does not contain a field {field}"))
            })?
            .to_string();
        if associated.contains_key(&key) {
            return Err(BoardError::AmbiguousName {
                name: key,
                count: 2,
            });
        }
        associated.insert(key, object);
    }
    Ok(associated)
}
