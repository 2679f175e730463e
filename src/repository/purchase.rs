use std::collections::HashMap;

use diesel::dsl::{avg, count};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::purchase::{
        BrandCount, NewPurchase as DomainNewPurchase, PlatformCount, Purchase as DomainPurchase,
        PurchaseLead, PurchaseListQuery, PurchaseStatistics,
        UpdatePurchase as DomainUpdatePurchase,
    },
    models::{
        asin_bank::AsinBankEntry as DbAsinBankEntry,
        purchase::{
            NewPurchase as DbNewPurchase, Purchase as DbPurchase,
            UpdatePurchase as DbUpdatePurchase,
        },
    },
    repository::{DieselRepository, PurchaseReader, PurchaseWriter, contains_pattern, window},
    schema::{asin_bank, oa_sourcing, purchase_tracker, retailers},
};

const TOP_LIMIT: usize = 5;

fn filtered(query: &PurchaseListQuery) -> purchase_tracker::BoxedQuery<'static, Sqlite> {
    let mut items = purchase_tracker::table.into_boxed::<Sqlite>();

    if let Some(platform) = query.platform.as_ref() {
        items = items.filter(purchase_tracker::platform.like(contains_pattern(platform)));
    }

    if let Some(status) = query.status.as_ref() {
        items = items.filter(purchase_tracker::status.eq(status.clone()));
    }

    if let Some(start) = query.start_date {
        items = items.filter(purchase_tracker::purchase_date.ge(start));
    }

    if let Some(end) = query.end_date {
        items = items.filter(purchase_tracker::purchase_date.le(end));
    }

    if let Some(lead_id) = query.lead_id.as_ref() {
        items = items.filter(purchase_tracker::lead_id.eq(lead_id.clone()));
    }

    items
}

impl PurchaseReader for DieselRepository {
    fn get_purchase_by_id(&self, id: i32) -> RepositoryResult<Option<DomainPurchase>> {
        let mut conn = self.conn()?;
        let purchase = purchase_tracker::table
            .filter(purchase_tracker::id.eq(id))
            .first::<DbPurchase>(&mut conn)
            .optional()?;

        match purchase {
            Some(purchase) => Ok(hydrate_purchases(&mut conn, vec![purchase])?.pop()),
            None => Ok(None),
        }
    }

    fn list_purchases(
        &self,
        query: PurchaseListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainPurchase>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered(&query).order(purchase_tracker::id.desc());
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbPurchase>(&mut conn)?;
        Ok((total, hydrate_purchases(&mut conn, rows)?))
    }

    fn order_number_exists(&self, order_number: &str) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;
        let found = purchase_tracker::table
            .filter(purchase_tracker::order_number.eq(order_number))
            .count()
            .get_result::<i64>(&mut conn)?;
        Ok(found > 0)
    }

    fn purchase_statistics(&self) -> RepositoryResult<PurchaseStatistics> {
        let mut conn = self.conn()?;

        let total_leads = oa_sourcing::table.count().get_result::<i64>(&mut conn)?;
        let total_purchases = purchase_tracker::table
            .count()
            .get_result::<i64>(&mut conn)?;
        let total_asins_in_bank = asin_bank::table.count().get_result::<i64>(&mut conn)?;

        let spend_rows = purchase_tracker::table
            .inner_join(oa_sourcing::table)
            .select((
                oa_sourcing::ppu_including_ship,
                purchase_tracker::final_qty,
                oa_sourcing::retailer_id,
            ))
            .load::<(Option<f64>, Option<i32>, Option<i32>)>(&mut conn)?;

        let total_spend: f64 = spend_rows
            .iter()
            .filter_map(|(ppu, qty, _)| Some(ppu.as_ref()? * f64::from(*qty.as_ref()?)))
            .sum();

        let average_ppu = oa_sourcing::table
            .select(avg(oa_sourcing::ppu_including_ship))
            .first::<Option<f64>>(&mut conn)?
            .unwrap_or_default();

        let mut top_platforms: Vec<PlatformCount> = purchase_tracker::table
            .group_by(purchase_tracker::platform)
            .select((purchase_tracker::platform, count(purchase_tracker::id)))
            .load::<(Option<String>, i64)>(&mut conn)?
            .into_iter()
            .filter_map(|(platform, count)| Some(PlatformCount { platform: platform?, count }))
            .collect();
        top_platforms.sort_by(|a, b| b.count.cmp(&a.count).then(a.platform.cmp(&b.platform)));
        top_platforms.truncate(TOP_LIMIT);

        let mut per_retailer: HashMap<i32, i64> = HashMap::new();
        for retailer_id in spend_rows.iter().filter_map(|(_, _, retailer_id)| *retailer_id) {
            *per_retailer.entry(retailer_id).or_default() += 1;
        }
        let retailer_ids: Vec<i32> = per_retailer.keys().copied().collect();
        let names: HashMap<i32, String> = retailers::table
            .filter(retailers::id.eq_any(retailer_ids.as_slice()))
            .select((retailers::id, retailers::name))
            .load::<(i32, String)>(&mut conn)?
            .into_iter()
            .collect();

        let mut top_brands: Vec<BrandCount> = per_retailer
            .into_iter()
            .filter_map(|(retailer_id, count)| {
                Some(BrandCount {
                    brand: names.get(&retailer_id)?.clone(),
                    count,
                })
            })
            .collect();
        top_brands.sort_by(|a, b| b.count.cmp(&a.count).then(a.brand.cmp(&b.brand)));
        top_brands.truncate(TOP_LIMIT);

        Ok(PurchaseStatistics {
            total_leads,
            total_purchases,
            total_asins_in_bank,
            total_spend: (total_spend * 100.0).round() / 100.0,
            average_ppu,
            top_platforms,
            top_brands,
        })
    }
}

impl PurchaseWriter for DieselRepository {
    fn create_order_purchases(
        &self,
        order_number: &str,
        new_purchases: &[DomainNewPurchase],
    ) -> RepositoryResult<Option<usize>> {
        let mut conn = self.conn()?;

        // Takes the write lock before the duplicate check.
        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing = purchase_tracker::table
                .filter(purchase_tracker::order_number.eq(order_number))
                .count()
                .get_result::<i64>(conn)?;
            if existing > 0 {
                return Ok(None);
            }

            let mut created = 0;
            for purchase in new_purchases {
                created += diesel::insert_into(purchase_tracker::table)
                    .values(&DbNewPurchase::from(purchase))
                    .execute(conn)?;
            }
            Ok(Some(created))
        })
    }

    fn update_purchase(
        &self,
        id: i32,
        updates: &DomainUpdatePurchase,
    ) -> RepositoryResult<DomainPurchase> {
        let mut conn = self.conn()?;
        let target = purchase_tracker::table.filter(purchase_tracker::id.eq(id));

        let row = if updates.is_empty() {
            target.first::<DbPurchase>(&mut conn).optional()?
        } else {
            diesel::update(target)
                .set(&DbUpdatePurchase::from(updates))
                .get_result::<DbPurchase>(&mut conn)
                .optional()?
        };

        let row = row.ok_or(RepositoryError::NotFound)?;
        hydrate_purchases(&mut conn, vec![row])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_purchase(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(purchase_tracker::table.filter(purchase_tracker::id.eq(id)))
            .execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

type LeadColumns = (
    i32,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<i32>,
);

/// Attach lead pricing, retailer name and ASIN to purchase rows.
fn hydrate_purchases(
    conn: &mut SqliteConnection,
    rows: Vec<DbPurchase>,
) -> RepositoryResult<Vec<DomainPurchase>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let lead_ids: Vec<i32> = rows.iter().map(|row| row.oa_sourcing_id).collect();
    let asin_ids: Vec<i32> = rows.iter().filter_map(|row| row.asin_bank_id).collect();

    let leads = oa_sourcing::table
        .filter(oa_sourcing::id.eq_any(lead_ids.as_slice()))
        .select((
            oa_sourcing::id,
            oa_sourcing::product_name,
            oa_sourcing::product_sku,
            oa_sourcing::submitted_by,
            oa_sourcing::ppu_including_ship,
            oa_sourcing::rsp,
            oa_sourcing::retailer_id,
        ))
        .load::<LeadColumns>(conn)?;

    let retailer_ids: Vec<i32> = leads.iter().filter_map(|lead| lead.6).collect();
    let retailer_names: HashMap<i32, String> = retailers::table
        .filter(retailers::id.eq_any(retailer_ids.as_slice()))
        .select((retailers::id, retailers::name))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let lead_map: HashMap<i32, PurchaseLead> = leads
        .into_iter()
        .map(
            |(id, product_name, product_sku, submitted_by, ppu, rsp, retailer_id)| {
                let retailer_name = retailer_id.and_then(|rid| retailer_names.get(&rid).cloned());
                (
                    id,
                    PurchaseLead {
                        product_name,
                        product_sku,
                        submitted_by,
                        ppu,
                        rsp,
                        retailer_name,
                    },
                )
            },
        )
        .collect();

    let asin_map: HashMap<i32, DbAsinBankEntry> = asin_bank::table
        .filter(asin_bank::id.eq_any(asin_ids.as_slice()))
        .load::<DbAsinBankEntry>(conn)?
        .into_iter()
        .map(|entry| (entry.id, entry))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let lead = lead_map.get(&row.oa_sourcing_id).cloned();
            let asin = row
                .asin_bank_id
                .and_then(|id| asin_map.get(&id).cloned())
                .map(Into::into);
            let mut purchase: DomainPurchase = row.into();
            purchase.lead = lead;
            purchase.asin = asin;
            purchase
        })
        .collect())
}
