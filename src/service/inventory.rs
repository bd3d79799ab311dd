use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{info, warn};

use crate::error::ClinicError;
use crate::models::{InventoryItem, NewInventoryItem};
use crate::schema::inventory;
use crate::service::{money, optional_text, required_text};

pub fn add_item(conn: &mut PgConnection, item: NewInventoryItem) -> Result<InventoryItem, ClinicError> {
    if item.quantity < 0 {
        return Err(ClinicError::validation("quantity must not be negative"));
    }
    let item = NewInventoryItem {
        name: required_text("name", &item.name)?,
        description: optional_text(item.description),
        quantity: item.quantity,
        unit_price: money("unit_price", item.unit_price, true)?,
    };
    let item = diesel::insert_into(inventory::table)
        .values(&item)
        .returning(InventoryItem::as_returning())
        .get_result(conn)?;
    info!("stocked {} x {} (item {})", item.quantity, item.name, item.id);
    Ok(item)
}

pub fn find_item(conn: &mut PgConnection, item_id: i32) -> Result<InventoryItem, ClinicError> {
    inventory::table
        .find(item_id)
        .select(InventoryItem::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "inventory item",
            id: item_id,
        })
}

/// Adds `delta` units to an item (negative to dispense). The stock never
/// drops below zero.
pub fn adjust_stock(conn: &mut PgConnection, item_id: i32, delta: i32) -> Result<InventoryItem, ClinicError> {
    conn.transaction::<_, ClinicError, _>(|conn| {
        let item = inventory::table
            .find(item_id)
            .select(InventoryItem::as_select())
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(ClinicError::NotFound {
                entity: "inventory item",
                id: item_id,
            })?;

        let quantity = match item.quantity.checked_add(delta) {
            Some(q) if q >= 0 => q,
            Some(_) => {
                warn!("item {item_id}: cannot remove {} of {}", delta.saturating_neg(), item.quantity);
                return Err(ClinicError::InsufficientStock {
                    item_id,
                    available: item.quantity,
                    requested: delta.saturating_neg(),
                });
            }
            None => return Err(ClinicError::validation("stock adjustment overflows")),
        };

        Ok(diesel::update(inventory::table.find(item_id))
            .set(inventory::quantity.eq(quantity))
            .returning(InventoryItem::as_returning())
            .get_result(conn)?)
    })
}

/// Items at or below `threshold` units.
pub fn low_stock(conn: &mut PgConnection, threshold: i32) -> Result<Vec<InventoryItem>, ClinicError> {
    Ok(inventory::table
        .filter(inventory::quantity.le(threshold))
        .select(InventoryItem::as_select())
        .order((inventory::quantity.asc(), inventory::name.asc()))
        .load(conn)?)
}
