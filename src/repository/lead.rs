use std::collections::HashMap;

use diesel::dsl::{avg, count};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::lead::{
        Lead as DomainLead, LeadAsin, LeadListQuery, LeadSubmission, MAX_ASINS_PER_LEAD,
        NewLead as DomainNewLead, NewLeadAsin, RetailerLeadStats,
        UpdateLead as DomainUpdateLead,
    },
    models::{
        asin_bank::{AsinBankEntry as DbAsinBankEntry, NewAsinBankEntry as DbNewAsinBankEntry},
        lead::{
            Lead as DbLead, LeadAsinSlot as DbLeadAsinSlot, NewLead as DbNewLead,
            NewLeadAsinSlot as DbNewLeadAsinSlot, UpdateLead as DbUpdateLead,
        },
    },
    repository::{DieselRepository, LeadReader, LeadWriter, contains_pattern, window},
    schema::{asin_bank, oa_sourcing, oa_sourcing_asins, retailers},
};

impl LeadReader for DieselRepository {
    fn get_lead_by_lead_id(&self, lead_id: &str) -> RepositoryResult<Option<DomainLead>> {
        let mut conn = self.conn()?;
        let lead = oa_sourcing::table
            .filter(oa_sourcing::lead_id.eq(lead_id))
            .first::<DbLead>(&mut conn)
            .optional()?;

        match lead {
            Some(lead) => Ok(hydrate_leads(&mut conn, vec![lead])?.pop()),
            None => Ok(None),
        }
    }

    fn get_lead_by_unique_id(&self, unique_id: &str) -> RepositoryResult<Option<DomainLead>> {
        let mut conn = self.conn()?;
        let lead = oa_sourcing::table
            .filter(oa_sourcing::unique_id.eq(unique_id))
            .order(oa_sourcing::id.asc())
            .first::<DbLead>(&mut conn)
            .optional()?;

        match lead {
            Some(lead) => Ok(hydrate_leads(&mut conn, vec![lead])?.pop()),
            None => Ok(None),
        }
    }

    fn lead_id_exists(&self, lead_id: &str) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        let found = oa_sourcing::table
            .filter(oa_sourcing::lead_id.eq(lead_id))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(found > 0)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<DomainLead>)> {
        let mut conn = self.conn()?;

        let retailer_ids = match query.retailer.as_ref() {
            Some(term) => Some(
                retailers::table
                    .filter(retailers::name.like(contains_pattern(term)))
                    .select(retailers::id)
                    .load::<i32>(&mut conn)?,
            ),
            None => None,
        };

        let filtered = || {
            let mut items = oa_sourcing::table.into_boxed::<Sqlite>();
            if let Some(ids) = retailer_ids.as_ref() {
                items = items.filter(oa_sourcing::retailer_id.eq_any(ids.clone()));
            }
            if let Some(sourcer) = query.sourcer.as_ref() {
                items = items.filter(oa_sourcing::sourcer.eq(sourcer.clone()));
            }
            items
        };

        let total = filtered().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered().order(oa_sourcing::id.desc());
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbLead>(&mut conn)?;
        Ok((total, hydrate_leads(&mut conn, rows)?))
    }

    fn lead_stats_by_retailer(&self) -> RepositoryResult<Vec<RetailerLeadStats>> {
        let mut conn = self.conn()?;

        let rows = oa_sourcing::table
            .inner_join(retailers::table)
            .group_by((retailers::id, retailers::name))
            .select((
                retailers::id,
                retailers::name,
                count(oa_sourcing::id),
                avg(oa_sourcing::ppu_including_ship),
                avg(oa_sourcing::margin),
            ))
            .load::<(i32, String, i64, Option<f64>, Option<f64>)>(&mut conn)?;

        let mut stats: Vec<RetailerLeadStats> = rows
            .into_iter()
            .map(
                |(retailer_id, retailer, lead_count, avg_ppu, avg_margin)| RetailerLeadStats {
                    retailer_id,
                    retailer,
                    lead_count,
                    avg_ppu,
                    avg_margin,
                },
            )
            .collect();
        stats.sort_by(|a, b| b.lead_count.cmp(&a.lead_count));

        Ok(stats)
    }
}

impl LeadWriter for DieselRepository {
    fn submit_lead(
        &self,
        new_lead: &DomainNewLead,
        asins: &[NewLeadAsin],
    ) -> RepositoryResult<LeadSubmission> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(oa_sourcing::table)
                .values(&DbNewLead::from(new_lead))
                .get_result::<DbLead>(conn)?;

            let mut asins_created = 0;
            let mut asins_reused = 0;
            let mut slots = Vec::with_capacity(asins.len().min(MAX_ASINS_PER_LEAD));

            for (index, asin) in asins.iter().enumerate() {
                let entry = match find_exact_asin(conn, &asin.asin, asin.size.as_deref())? {
                    Some(existing) => {
                        log::info!(
                            "Reusing ASIN {} ({:?}) for lead {}",
                            existing.asin,
                            existing.size,
                            created.lead_id
                        );
                        asins_reused += 1;
                        existing
                    }
                    None => {
                        asins_created += 1;
                        diesel::insert_into(asin_bank::table)
                            .values(&DbNewAsinBankEntry {
                                lead_id: created.lead_id.as_str(),
                                size: asin.size.as_deref(),
                                asin: asin.asin.as_str(),
                            })
                            .get_result::<DbAsinBankEntry>(conn)?
                    }
                };

                if index < MAX_ASINS_PER_LEAD {
                    slots.push(DbNewLeadAsinSlot {
                        oa_sourcing_id: created.id,
                        slot: index as i32 + 1,
                        asin_bank_id: entry.id,
                        recommended_quantity: Some(asin.recommended_quantity),
                    });
                }
            }

            for slot in &slots {
                diesel::insert_into(oa_sourcing_asins::table)
                    .values(slot)
                    .execute(conn)?;
            }

            Ok(LeadSubmission {
                lead_id: created.lead_id,
                id: created.id,
                asins_created,
                asins_reused,
                total_asins: asins.len(),
                total_suggested_qty: created.suggested_total_qty.unwrap_or_else(|| {
                    asins.iter().map(|asin| asin.recommended_quantity).sum()
                }),
            })
        })
    }

    fn update_lead(
        &self,
        lead_id: &str,
        updates: &DomainUpdateLead,
    ) -> RepositoryResult<DomainLead> {
        let mut conn = self.conn()?;
        let target = oa_sourcing::table.filter(oa_sourcing::lead_id.eq(lead_id));

        let row = if updates.is_empty() {
            target.first::<DbLead>(&mut conn).optional()?
        } else {
            diesel::update(target)
                .set(&DbUpdateLead::from(updates))
                .get_result::<DbLead>(&mut conn)
                .optional()?
        };

        let row = row.ok_or(RepositoryError::NotFound)?;
        hydrate_leads(&mut conn, vec![row])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }
}

/// Row with this ASIN and exactly this size, `None` matching a missing size.
fn find_exact_asin(
    conn: &mut SqliteConnection,
    asin: &str,
    size: Option<&str>,
) -> RepositoryResult<Option<DbAsinBankEntry>> {
    let mut query = asin_bank::table
        .filter(asin_bank::asin.eq(asin.to_string()))
        .into_boxed::<Sqlite>();

    query = match size {
        Some(size) => query.filter(asin_bank::size.eq(size.to_string())),
        None => query.filter(asin_bank::size.is_null()),
    };

    Ok(query
        .order(asin_bank::id.asc())
        .first::<DbAsinBankEntry>(conn)
        .optional()?)
}

/// Attach retailer names and ASIN slots to lead rows.
///
/// Leads without slots fall back to the ASIN bank rows carrying their
/// `lead_id`, with a recommended quantity of one.
fn hydrate_leads(
    conn: &mut SqliteConnection,
    rows: Vec<DbLead>,
) -> RepositoryResult<Vec<DomainLead>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let lead_ids: Vec<i32> = rows.iter().map(|lead| lead.id).collect();
    let retailer_ids: Vec<i32> = rows.iter().filter_map(|lead| lead.retailer_id).collect();

    let retailer_names: HashMap<i32, String> = retailers::table
        .filter(retailers::id.eq_any(retailer_ids.as_slice()))
        .select((retailers::id, retailers::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let slot_rows = oa_sourcing_asins::table
        .inner_join(asin_bank::table)
        .filter(oa_sourcing_asins::oa_sourcing_id.eq_any(lead_ids.as_slice()))
        .order((
            oa_sourcing_asins::oa_sourcing_id.asc(),
            oa_sourcing_asins::slot.asc(),
        ))
        .select((DbLeadAsinSlot::as_select(), DbAsinBankEntry::as_select()))
        .load::<(DbLeadAsinSlot, DbAsinBankEntry)>(conn)?;

    let mut slots: HashMap<i32, Vec<LeadAsin>> = HashMap::new();
    for (slot, entry) in slot_rows {
        slots.entry(slot.oa_sourcing_id).or_default().push(LeadAsin {
            slot: slot.slot,
            asin_bank_id: entry.id,
            asin: entry.asin,
            size: entry.size,
            // Slots saved without a quantity display as one unit.
            recommended_quantity: slot.recommended_quantity.unwrap_or(1),
        });
    }

    let unslotted: Vec<String> = rows
        .iter()
        .filter(|lead| !slots.contains_key(&lead.id))
        .map(|lead| lead.lead_id.clone())
        .collect();

    let mut banked: HashMap<String, Vec<LeadAsin>> = HashMap::new();
    if !unslotted.is_empty() {
        let entries = asin_bank::table
            .filter(asin_bank::lead_id.eq_any(unslotted.as_slice()))
            .order(asin_bank::id.asc())
            .load::<DbAsinBankEntry>(conn)?;
        for entry in entries {
            let list = banked.entry(entry.lead_id.clone()).or_default();
            list.push(LeadAsin {
                slot: list.len() as i32 + 1,
                asin_bank_id: entry.id,
                asin: entry.asin,
                size: entry.size,
                recommended_quantity: 1,
            });
        }
    }

    let leads = rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            let mut lead: DomainLead = row.into();
            lead.retailer_name = lead
                .retailer_id
                .and_then(|retailer_id| retailer_names.get(&retailer_id).cloned());
            lead.asins = slots
                .remove(&id)
                .or_else(|| banked.remove(&lead.lead_id))
                .unwrap_or_default();
            lead
        })
        .collect();

    Ok(leads)
}
