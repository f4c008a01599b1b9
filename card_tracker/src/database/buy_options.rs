//! Seller and buy-option queries

use super::{clean_text, new_id, now};
use crate::error::{Result, TrackerError};
use collection_common::{BuyOption, BuyOptionUpdate, NewBuyOption, NewSeller, Seller, SellerUpdate};
use rusqlite::{params, Connection, OptionalExtension, Row};

// ── Sellers ────────────────────────────────────────────────────────────────

fn seller_from_row(row: &Row<'_>) -> rusqlite::Result<Seller> {
    Ok(Seller {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        url: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn list_sellers(conn: &Connection, owner: &str) -> Result<Vec<Seller>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, owner_id, name, url, created_at FROM sellers
         WHERE owner_id = ?1 ORDER BY name ASC",
    )?;
    let sellers = stmt
        .query_map(params![owner], seller_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sellers)
}

fn get_seller(conn: &Connection, owner: &str, id: &str) -> Result<Option<Seller>> {
    let seller = conn
        .query_row(
            "SELECT id, owner_id, name, url, created_at FROM sellers
             WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            seller_from_row,
        )
        .optional()?;
    Ok(seller)
}

fn seller_exists(conn: &Connection, owner: &str, id: &str) -> Result<bool> {
    Ok(get_seller(conn, owner, id)?.is_some())
}

pub fn create_seller(conn: &Connection, owner: &str, new: &NewSeller) -> Result<Seller> {
    new.validate()?;

    let seller = Seller {
        id: new_id(),
        owner_id: owner.to_string(),
        name: new.name.trim().to_string(),
        url: clean_text(new.url.as_deref()),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO sellers (id, owner_id, name, url, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&seller.id, owner, &seller.name, &seller.url, &seller.created_at],
    )?;

    log::info!("Created seller {} ({})", seller.name, seller.id);
    Ok(seller)
}

pub fn update_seller(
    conn: &Connection,
    owner: &str,
    id: &str,
    update: &SellerUpdate,
) -> Result<Seller> {
    update.validate()?;

    let mut seller = get_seller(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("seller", id))?;
    if let Some(name) = &update.name {
        seller.name = name.trim().to_string();
    }
    if let Some(url) = &update.url {
        seller.url = clean_text(url.as_deref());
    }

    conn.execute(
        "UPDATE sellers SET name = ?1, url = ?2 WHERE id = ?3 AND owner_id = ?4",
        params![&seller.name, &seller.url, id, owner],
    )?;

    log::info!("Updated seller {} ({})", seller.name, seller.id);
    Ok(seller)
}

/// Delete a seller; its buy options stay, without a seller
pub fn delete_seller(conn: &Connection, owner: &str, id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM sellers WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if deleted == 0 {
        return Err(TrackerError::not_found("seller", id));
    }
    log::info!("Deleted seller {}", id);
    Ok(())
}

// ── Buy options ────────────────────────────────────────────────────────────

const BUY_OPTION_SELECT: &str = "SELECT b.id, b.card_id, b.seller_id, b.price, b.shipping_cost,
        b.source_url, b.notes, b.created_at,
        s.id, s.owner_id, s.name, s.url, s.created_at
    FROM buy_options b
    JOIN cards c ON c.id = b.card_id
    JOIN players p ON p.id = c.player_id
    LEFT JOIN sellers s ON s.id = b.seller_id";

fn buy_option_from_row(row: &Row<'_>) -> rusqlite::Result<BuyOption> {
    let seller_id: Option<String> = row.get(8)?;
    let seller = match seller_id {
        Some(id) => Some(Seller {
            id,
            owner_id: row.get(9)?,
            name: row.get(10)?,
            url: row.get(11)?,
            created_at: row.get(12)?,
        }),
        None => None,
    };

    Ok(BuyOption {
        id: row.get(0)?,
        card_id: row.get(1)?,
        seller_id: row.get(2)?,
        seller,
        price: row.get(3)?,
        shipping_cost: row.get(4)?,
        source_url: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn card_owned_by(conn: &Connection, owner: &str, card_id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM cards c JOIN players p ON p.id = c.player_id
             WHERE c.id = ?1 AND p.owner_id = ?2",
            params![card_id, owner],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// A card's buy options, newest first, with sellers embedded
pub fn list_buy_options(conn: &Connection, owner: &str, card_id: &str) -> Result<Vec<BuyOption>> {
    if !card_owned_by(conn, owner, card_id)? {
        return Err(TrackerError::not_found("card", card_id));
    }

    let mut stmt = conn.prepare_cached(&format!(
        "{BUY_OPTION_SELECT}
         WHERE b.card_id = ?1 AND p.owner_id = ?2
         ORDER BY b.created_at DESC, b.rowid DESC"
    ))?;
    let options = stmt
        .query_map(params![card_id, owner], buy_option_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(options)
}

fn get_buy_option(conn: &Connection, owner: &str, id: &str) -> Result<Option<BuyOption>> {
    let option = conn
        .query_row(
            &format!("{BUY_OPTION_SELECT} WHERE b.id = ?1 AND p.owner_id = ?2"),
            params![id, owner],
            buy_option_from_row,
        )
        .optional()?;
    Ok(option)
}

pub fn create_buy_option(
    conn: &Connection,
    owner: &str,
    card_id: &str,
    new: &NewBuyOption,
) -> Result<BuyOption> {
    new.validate()?;
    if !card_owned_by(conn, owner, card_id)? {
        return Err(TrackerError::not_found("card", card_id));
    }
    let seller_id = clean_text(new.seller_id.as_deref());
    if let Some(seller_id) = &seller_id {
        if !seller_exists(conn, owner, seller_id)? {
            return Err(TrackerError::not_found("seller", seller_id));
        }
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO buy_options (id, card_id, seller_id, price, shipping_cost, source_url, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &id,
            card_id,
            seller_id,
            new.price,
            new.shipping_cost.unwrap_or(0.0),
            clean_text(new.source_url.as_deref()),
            clean_text(new.notes.as_deref()),
            now()
        ],
    )?;

    log::info!("Added buy option {} for card {}", id, card_id);
    get_buy_option(conn, owner, &id)?.ok_or_else(|| TrackerError::not_found("buy option", &id))
}

/// Apply a partial update to a buy option and return the stored row
pub fn update_buy_option(
    conn: &Connection,
    owner: &str,
    id: &str,
    update: &BuyOptionUpdate,
) -> Result<BuyOption> {
    update.validate()?;

    let mut option =
        get_buy_option(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("buy option", id))?;

    if let Some(seller_id) = &update.seller_id {
        let seller_id = clean_text(seller_id.as_deref());
        if let Some(seller_id) = &seller_id {
            if !seller_exists(conn, owner, seller_id)? {
                return Err(TrackerError::not_found("seller", seller_id));
            }
        }
        option.seller_id = seller_id;
    }
    if let Some(source_url) = &update.source_url {
        option.source_url = clean_text(source_url.as_deref());
    }
    if let Some(price) = update.price {
        option.price = price;
    }
    if let Some(shipping_cost) = update.shipping_cost {
        option.shipping_cost = shipping_cost;
    }
    if let Some(notes) = &update.notes {
        option.notes = clean_text(notes.as_deref());
    }

    conn.execute(
        "UPDATE buy_options
         SET seller_id = ?1, price = ?2, shipping_cost = ?3, source_url = ?4, notes = ?5
         WHERE id = ?6",
        params![
            &option.seller_id,
            option.price,
            option.shipping_cost,
            &option.source_url,
            &option.notes,
            id
        ],
    )?;

    log::info!("Updated buy option {}", id);
    get_buy_option(conn, owner, id)?.ok_or_else(|| TrackerError::not_found("buy option", id))
}

pub fn delete_buy_option(conn: &Connection, owner: &str, id: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM buy_options
         WHERE id = ?1
           AND card_id IN (
               SELECT c.id FROM cards c JOIN players p ON p.id = c.player_id
               WHERE p.owner_id = ?2
           )",
        params![id, owner],
    )?;
    if deleted == 0 {
        return Err(TrackerError::not_found("buy option", id));
    }
    log::info!("Deleted buy option {}", id);
    Ok(())
}
