use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use diesel::dsl::{count, sum};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::checkin::{
        CHECKIN_LEAD_ID, Checkin as DomainCheckin, CheckinListQuery, CheckinSummary,
        InboundRecord, NewCheckin as DomainNewCheckin, OrderCheckinTotal,
        UpdateCheckin as DomainUpdateCheckin,
    },
    domain::retailer_order::InboundItem,
    models::{
        asin_bank::{AsinBankEntry as DbAsinBankEntry, NewAsinBankEntry as DbNewAsinBankEntry},
        checkin::{
            Checkin as DbCheckin, NewCheckin as DbNewCheckin, UpdateCheckin as DbUpdateCheckin,
        },
    },
    repository::{CheckinReader, CheckinWriter, DieselRepository, contains_pattern, window},
    schema::{asin_bank, checkin},
};

const TOP_ORDERS: usize = 10;

fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

impl CheckinReader for DieselRepository {
    fn get_checkin_by_id(&self, id: i32) -> RepositoryResult<Option<DomainCheckin>> {
        let mut conn = self.conn()?;
        let row = checkin::table
            .filter(checkin::id.eq(id))
            .first::<DbCheckin>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(hydrate_checkins(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn list_checkins(
        &self,
        query: CheckinListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCheckin>)> {
        let mut conn = self.conn()?;

        let asin_ids = match query.asin.as_ref() {
            Some(asin) => Some(
                asin_bank::table
                    .filter(asin_bank::asin.like(contains_pattern(asin)))
                    .select(asin_bank::id)
                    .load::<i32>(&mut conn)?,
            ),
            None => None,
        };

        let filtered = || {
            let mut items = checkin::table.into_boxed::<Sqlite>();
            if let Some(order_number) = query.order_number.as_ref() {
                items = items.filter(checkin::order_number.like(contains_pattern(order_number)));
            }
            if let Some(ids) = asin_ids.as_ref() {
                items = items.filter(checkin::asin_bank_id.eq_any(ids.clone()));
            }
            if let Some(start) = query.start_date {
                items = items.filter(checkin::checked_in_at.ge(day_start(start)));
            }
            if let Some(end) = query.end_date.and_then(|end| end.checked_add_days(Days::new(1))) {
                items = items.filter(checkin::checked_in_at.lt(day_start(end)));
            }
            items
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered().order((checkin::checked_in_at.desc(), checkin::id.desc()));
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbCheckin>(&mut conn)?;
        Ok((total, hydrate_checkins(&mut conn, rows)?))
    }

    fn list_order_checkins(&self, order_number: &str) -> RepositoryResult<Vec<DomainCheckin>> {
        let mut conn = self.conn()?;
        let rows = checkin::table
            .filter(checkin::order_number.eq(order_number))
            .order((checkin::checked_in_at.desc(), checkin::id.desc()))
            .load::<DbCheckin>(&mut conn)?;
        hydrate_checkins(&mut conn, rows)
    }

    fn checkin_summary(&self, today: NaiveDate) -> RepositoryResult<CheckinSummary> {
        let mut conn = self.conn()?;

        let total_checkins = checkin::table.count().get_result::<i64>(&mut conn)?;
        let total_quantity_checked_in = checkin::table
            .select(sum(checkin::quantity))
            .first::<Option<i64>>(&mut conn)?
            .unwrap_or_default();
        let checkins_today = checkin::table
            .filter(checkin::checked_in_at.ge(day_start(today)))
            .count()
            .get_result::<i64>(&mut conn)?;

        let mut top_orders: Vec<OrderCheckinTotal> = checkin::table
            .group_by(checkin::order_number)
            .select((
                checkin::order_number,
                sum(checkin::quantity),
                count(checkin::id),
            ))
            .load::<(Option<String>, Option<i64>, i64)>(&mut conn)?
            .into_iter()
            .filter_map(|(order_number, quantity, checkin_count)| {
                Some(OrderCheckinTotal {
                    order_number: order_number?,
                    total_quantity: quantity.unwrap_or_default(),
                    checkin_count,
                })
            })
            .collect();
        top_orders.sort_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(a.order_number.cmp(&b.order_number))
        });
        top_orders.truncate(TOP_ORDERS);

        Ok(CheckinSummary {
            total_checkins,
            total_quantity_checked_in,
            checkins_today,
            top_orders,
        })
    }
}

impl CheckinWriter for DieselRepository {
    fn create_checkin(&self, new_checkin: &DomainNewCheckin) -> RepositoryResult<DomainCheckin> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(checkin::table)
            .values(&DbNewCheckin::from(new_checkin))
            .get_result::<DbCheckin>(&mut conn)?;

        hydrate_checkins(&mut conn, vec![created])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn update_checkin(
        &self,
        id: i32,
        updates: &DomainUpdateCheckin,
    ) -> RepositoryResult<DomainCheckin> {
        let mut conn = self.conn()?;
        let target = checkin::table.filter(checkin::id.eq(id));

        let row = if updates.is_empty() {
            target.first::<DbCheckin>(&mut conn).optional()?
        } else {
            diesel::update(target)
                .set(&DbUpdateCheckin::from(updates))
                .get_result::<DbCheckin>(&mut conn)
                .optional()?
        };

        let row = row.ok_or(RepositoryError::NotFound)?;
        hydrate_checkins(&mut conn, vec![row])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_checkin(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(checkin::table.filter(checkin::id.eq(id))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn record_inbound(
        &self,
        order_number: &str,
        items: &[InboundItem],
        checked_in_at: NaiveDateTime,
    ) -> RepositoryResult<InboundRecord> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let mut record = InboundRecord::default();

            for item in items {
                let (asin_bank_id, created) = inbound_asin(conn, item)?;
                if created {
                    record.asins_created += 1;
                }

                // Rows inserted earlier in this transaction are visible here,
                // so repeated lines of the same email are caught too.
                let existing = checkin::table
                    .filter(checkin::order_number.eq(order_number))
                    .filter(checkin::asin_bank_id.eq(asin_bank_id))
                    .filter(checkin::item_name.eq(item.item_name.as_str()))
                    .filter(checkin::quantity.eq(item.quantity))
                    .count()
                    .get_result::<i64>(conn)?;
                if existing > 0 {
                    log::info!(
                        "Skipping duplicate check-in: order {order_number}, ASIN {}, qty {}",
                        item.asin,
                        item.quantity
                    );
                    record.skipped += 1;
                    continue;
                }

                let new_checkin = DomainNewCheckin::new(order_number, item.quantity, checked_in_at)
                    .with_item_name(item.item_name.as_str())
                    .with_asin(asin_bank_id);
                diesel::insert_into(checkin::table)
                    .values(&DbNewCheckin::from(&new_checkin))
                    .execute(conn)?;
                record.created += 1;
            }

            Ok(record)
        })
    }
}

/// Bank row for an inbound line, and whether it was created.
///
/// Prefers a row with the line's size, then a row with no size, which is
/// given the line's size.
fn inbound_asin(
    conn: &mut SqliteConnection,
    item: &InboundItem,
) -> RepositoryResult<(i32, bool)> {
    let rows = asin_bank::table
        .filter(asin_bank::asin.eq(item.asin.as_str()))
        .order(asin_bank::id.asc())
        .load::<DbAsinBankEntry>(conn)?;

    let existing = match item.size.as_deref() {
        None => rows.first().map(|row| row.id),
        Some(size) => match rows.iter().find(|row| row.size.as_deref() == Some(size)) {
            Some(row) => Some(row.id),
            None => match rows.iter().find(|row| row.size.is_none()) {
                Some(row) => {
                    diesel::update(asin_bank::table.filter(asin_bank::id.eq(row.id)))
                        .set(asin_bank::size.eq(size))
                        .execute(conn)?;
                    log::info!("Set size {size} on ASIN bank entry {}", row.id);
                    Some(row.id)
                }
                None => None,
            },
        },
    };
    if let Some(id) = existing {
        return Ok((id, false));
    }

    let created = diesel::insert_into(asin_bank::table)
        .values(&DbNewAsinBankEntry {
            lead_id: CHECKIN_LEAD_ID,
            size: item.size.as_deref(),
            asin: item.asin.as_str(),
        })
        .get_result::<DbAsinBankEntry>(conn)?;
    log::info!("Created ASIN bank entry {} for {}", created.id, item.asin);
    Ok((created.id, true))
}

fn hydrate_checkins(
    conn: &mut SqliteConnection,
    rows: Vec<DbCheckin>,
) -> RepositoryResult<Vec<DomainCheckin>> {
    let asin_ids: Vec<i32> = rows.iter().filter_map(|row| row.asin_bank_id).collect();
    if asin_ids.is_empty() {
        return Ok(rows.into_iter().map(Into::into).collect());
    }

    let entries: HashMap<i32, DbAsinBankEntry> = asin_bank::table
        .filter(asin_bank::id.eq_any(asin_ids.as_slice()))
        .load::<DbAsinBankEntry>(conn)?
        .into_iter()
        .map(|entry| (entry.id, entry))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let entry = row.asin_bank_id.and_then(|id| entries.get(&id));
            let asin = entry.map(|entry| entry.asin.clone());
            let size = entry.and_then(|entry| entry.size.clone());
            let mut domain: DomainCheckin = row.into();
            domain.asin = asin;
            domain.size = size;
            domain
        })
        .collect())
}
