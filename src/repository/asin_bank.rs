use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::asin_bank::{
        AsinBankEntry as DomainAsinBankEntry, AsinBankListQuery,
        NewAsinBankEntry as DomainNewAsinBankEntry,
    },
    models::asin_bank::{AsinBankEntry as DbAsinBankEntry, NewAsinBankEntry as DbNewAsinBankEntry},
    repository::{AsinBankReader, AsinBankWriter, DieselRepository, contains_pattern, window},
    schema::asin_bank,
};

fn filtered(query: &AsinBankListQuery) -> asin_bank::BoxedQuery<'static, Sqlite> {
    let mut items = asin_bank::table.into_boxed::<Sqlite>();

    if let Some(lead_id) = query.lead_id.as_ref() {
        items = items.filter(asin_bank::lead_id.eq(lead_id.clone()));
    }

    if let Some(asin) = query.asin.as_ref() {
        items = items.filter(asin_bank::asin.like(contains_pattern(asin)));
    }

    if let Some(size) = query.size.as_ref() {
        items = items.filter(asin_bank::size.like(contains_pattern(size)));
    }

    items
}

impl AsinBankReader for DieselRepository {
    fn list_asin_bank(
        &self,
        query: AsinBankListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainAsinBankEntry>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered(&query).order(asin_bank::id.asc());
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbAsinBankEntry>(&mut conn)?;
        Ok((total, rows.into_iter().map(Into::into).collect()))
    }

    fn find_asin(
        &self,
        asin: &str,
        size: Option<&str>,
    ) -> RepositoryResult<Option<DomainAsinBankEntry>> {
        let mut conn = self.conn()?;
        find_asin(&mut conn, asin, size)
    }

    fn find_lead_asin(
        &self,
        lead_id: &str,
        size: &str,
    ) -> RepositoryResult<Option<DomainAsinBankEntry>> {
        let mut conn = self.conn()?;
        let entry = asin_bank::table
            .filter(asin_bank::lead_id.eq(lead_id))
            .filter(asin_bank::size.eq(size))
            .order(asin_bank::id.asc())
            .first::<DbAsinBankEntry>(&mut conn)
            .optional()?;
        Ok(entry.map(Into::into))
    }
}

impl AsinBankWriter for DieselRepository {
    fn create_asin(
        &self,
        new_entry: &DomainNewAsinBankEntry,
    ) -> RepositoryResult<DomainAsinBankEntry> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(asin_bank::table)
            .values(&DbNewAsinBankEntry::from(new_entry))
            .get_result::<DbAsinBankEntry>(&mut conn)?;
        Ok(created.into())
    }
}

/// Oldest row carrying `asin`, restricted to `size` when one is given.
fn find_asin(
    conn: &mut SqliteConnection,
    asin: &str,
    size: Option<&str>,
) -> RepositoryResult<Option<DomainAsinBankEntry>> {
    let mut query = asin_bank::table
        .filter(asin_bank::asin.eq(asin.to_string()))
        .into_boxed::<Sqlite>();

    if let Some(size) = size {
        query = query.filter(asin_bank::size.eq(size.to_string()));
    }

    let entry = query
        .order(asin_bank::id.asc())
        .first::<DbAsinBankEntry>(conn)
        .optional()?;
    Ok(entry.map(Into::into))
}
