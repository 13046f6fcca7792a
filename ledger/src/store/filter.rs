//! Store-backed evaluation of filter queries.
//!
//! Resolves each leaf predicate to the set of matching transaction IDs, then
//! combines sets structurally: AND groups intersect, OR groups union. The
//! date range, when present, intersects the result.

use std::collections::HashSet;

use super::transactions::LineSummary;
use super::Store;
use crate::query::{evaluate, line_matches, FilterField, FilterNode, LeafResolver, ParsedQuery};
use crate::Result;

/// Set-valued resolver backed by the relational store.
pub struct TransactionResolver<'a> {
    store: &'a Store,
}

impl<'a> TransactionResolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl LeafResolver for TransactionResolver<'_> {
    type Output = HashSet<String>;

    fn resolve_leaf(
        &self,
        field: FilterField,
        value: &str,
        is_empty: bool,
    ) -> Result<HashSet<String>> {
        match field {
            FilterField::Category => {
                if is_empty {
                    self.store.transactions_without_category()
                } else {
                    let ids = self.store.find_category_ids(value)?;
                    self.store.transactions_with_category_ids(&ids)
                }
            }
            FilterField::Tag => {
                if is_empty {
                    self.store.transactions_without_tags()
                } else {
                    let ids = self.store.find_tag_ids(value)?;
                    self.store.transactions_with_tag_ids(&ids)
                }
            }
            FilterField::Account => {
                if is_empty {
                    // Every transaction belongs to an account
                    Ok(HashSet::new())
                } else {
                    let ids = self.store.find_account_ids(value)?;
                    self.store.transactions_in_accounts(&ids)
                }
            }
            FilterField::Counterparty => {
                if is_empty {
                    self.store.transactions_without_counterparty()
                } else {
                    self.store.transactions_with_counterparty(value)
                }
            }
        }
    }

    fn combine_all(&self, mut items: Vec<HashSet<String>>) -> HashSet<String> {
        let mut result = items.remove(0);
        for item in items {
            result.retain(|id| item.contains(id));
        }
        result
    }

    fn combine_any(&self, items: Vec<HashSet<String>>) -> HashSet<String> {
        let mut result = HashSet::new();
        for item in items {
            result.extend(item);
        }
        result
    }

    fn empty_group(&self) -> HashSet<String> {
        HashSet::new()
    }
}

impl Store {
    /// Resolve a query to the set of matching transaction IDs.
    ///
    /// A query with no filter tree matches everything; the date range, when
    /// present, narrows the result.
    pub fn filter_transactions(&self, query: &ParsedQuery) -> Result<HashSet<String>> {
        let matched = match &query.root {
            Some(root) => evaluate(root, &TransactionResolver::new(self))?,
            None => self.all_transaction_ids()?,
        };

        match query.date_range {
            Some(range) => {
                let in_range = self.transactions_between(range)?;
                Ok(matched
                    .into_iter()
                    .filter(|id| in_range.contains(id))
                    .collect())
            }
            None => Ok(matched),
        }
    }

    /// Lines of an already-matched transaction that pass the filter tree.
    ///
    /// Category leaves apply per line; tag, account, and counterparty leaves
    /// pass vacuously at line granularity.
    pub fn lines_matching(
        &self,
        transaction_id: &str,
        root: &FilterNode,
    ) -> Result<Vec<LineSummary>> {
        let mut lines = self.lines_for_transaction(transaction_id)?;
        lines.retain(|line| line_matches(line.category_name.as_deref(), root));
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::super::tests::setup_store;
    use super::super::TransactionBatch;
    use super::*;
    use crate::schema::{
        AccountRecord, CategoryRecord, TagRecord, TransactionLineRecord, TransactionRecord,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        store: Store,
        _tmp: tempfile::TempDir,
        account: AccountRecord,
        food: CategoryRecord,
    }

    /// Three transactions: #1 Food, #2 Food + travel tag, #3 travel tag only.
    fn fixture() -> (Fixture, [String; 3]) {
        let (_tmp, store) = setup_store();

        let account = AccountRecord::new("Checking");
        store.insert_account(&account).unwrap();
        let food = CategoryRecord::new("Food");
        store.insert_category(&food).unwrap();
        let travel = TagRecord::new("travel");
        store.insert_tag(&travel).unwrap();

        let mut ids = Vec::new();
        for (day, categorized, tagged) in [(1, true, false), (2, true, true), (3, false, true)] {
            let record = TransactionRecord::new(account.id, date(2024, 1, day), -100);
            let id = record.id;
            ids.push(id.to_string());

            let mut batch = TransactionBatch::new(record);
            if categorized {
                batch = batch.with_line(TransactionLineRecord::new(id, -100).with_category(food.id));
            }
            if tagged {
                batch = batch.with_tag(travel.id);
            }
            store.write_transaction(&batch).unwrap();
        }

        let ids: [String; 3] = [ids[0].clone(), ids[1].clone(), ids[2].clone()];
        (
            Fixture {
                store,
                _tmp,
                account,
                food,
            },
            ids,
        )
    }

    fn run(store: &Store, input: &str) -> HashSet<String> {
        store
            .filter_transactions(&ParsedQuery::from_input(input))
            .unwrap()
    }

    fn set(ids: &[&String]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_or_unions_and_intersects() {
        let (fx, [a, b, c]) = fixture();

        // Food on {a,b}, travel on {b,c}
        assert_eq!(
            run(&fx.store, "category:Food or tag:travel"),
            set(&[&a, &b, &c])
        );
        assert_eq!(run(&fx.store, "category:Food and tag:travel"), set(&[&b]));
    }

    #[test]
    fn test_no_filter_matches_everything() {
        let (fx, [a, b, c]) = fixture();
        assert_eq!(run(&fx.store, ""), set(&[&a, &b, &c]));
        assert_eq!(run(&fx.store, "gibberish input"), set(&[&a, &b, &c]));
    }

    #[test]
    fn test_unknown_name_matches_nothing() {
        let (fx, _) = fixture();
        assert!(run(&fx.store, "category:Rent").is_empty());
        assert!(run(&fx.store, "tag:vacation").is_empty());
    }

    #[test]
    fn test_substring_and_case_insensitive() {
        let (fx, [a, b, _]) = fixture();
        assert_eq!(run(&fx.store, "category:foo"), set(&[&a, &b]));
        assert_eq!(run(&fx.store, "CATEGORY:FOOD"), set(&[&a, &b]));
    }

    #[test]
    fn test_empty_sentinel_tag() {
        let (fx, [a, _, _]) = fixture();
        assert_eq!(run(&fx.store, "tag:-"), set(&[&a]));
    }

    #[test]
    fn test_empty_sentinel_category() {
        let (fx, [_, _, c]) = fixture();
        assert_eq!(run(&fx.store, "category:-"), set(&[&c]));
    }

    #[test]
    fn test_empty_sentinel_account_matches_nothing() {
        let (fx, _) = fixture();
        assert!(run(&fx.store, "account:-").is_empty());
    }

    #[test]
    fn test_account_filter() {
        let (fx, [a, b, c]) = fixture();
        assert_eq!(run(&fx.store, "account:check"), set(&[&a, &b, &c]));
        assert!(run(&fx.store, "account:savings").is_empty());
    }

    #[test]
    fn test_date_range_narrows() {
        let (fx, [a, b, _]) = fixture();
        assert_eq!(
            run(&fx.store, "between 1/1/24 and 1/2/24"),
            set(&[&a, &b])
        );
        assert_eq!(
            run(&fx.store, "tag:travel between 1/1/24 and 1/2/24"),
            set(&[&b])
        );
    }

    #[test]
    fn test_grouping_with_store() {
        let (fx, [a, b, _]) = fixture();
        // (Food or travel) and counterparty:- where nothing has a counterparty
        let matched = run(&fx.store, "(category:Food or tag:-) and counterparty:-");
        assert_eq!(matched, set(&[&a, &b]));
    }

    #[test]
    fn test_lines_matching_prunes_by_category() {
        let (fx, _) = fixture();

        // A split transaction: one Food line, one uncategorized line
        let record = TransactionRecord::new(fx.account.id, date(2024, 2, 1), -5000);
        let id = record.id;
        let batch = TransactionBatch::new(record)
            .with_line(TransactionLineRecord::new(id, -3000).with_category(fx.food.id))
            .with_line(TransactionLineRecord::new(id, -2000));
        fx.store.write_transaction(&batch).unwrap();

        let root = FilterNode::leaf(FilterField::Category, "food");
        let lines = fx.store.lines_matching(&id.to_string(), &root).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount_cents, -3000);
        assert_eq!(lines[0].category_name.as_deref(), Some("Food"));

        // Tag leaves pass vacuously at line granularity
        let root = FilterNode::leaf(FilterField::Tag, "travel");
        let lines = fx.store.lines_matching(&id.to_string(), &root).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_wire_round_trip_preserves_results() {
        let (fx, [_, b, _]) = fixture();

        let query = ParsedQuery::from_input("category:Food and tag:travel");
        let decoded = ParsedQuery::from_params(&query.to_params().unwrap()).unwrap();
        assert_eq!(fx.store.filter_transactions(&decoded).unwrap(), set(&[&b]));
    }

    #[test]
    fn test_wire_empty_group_matches_nothing() {
        let (fx, _) = fixture();

        // An empty group cannot come from parsing, only from the wire
        let query = ParsedQuery {
            root: Some(FilterNode::Group {
                operator: crate::query::GroupOperator::And,
                children: Vec::new(),
            }),
            date_range: None,
        };
        assert!(fx.store.filter_transactions(&query).unwrap().is_empty());
    }

    #[test]
    fn test_lines_matching_unknown_transaction() {
        let (fx, _) = fixture();
        let root = FilterNode::leaf(FilterField::Category, "food");
        let lines = fx
            .store
            .lines_matching(&Uuid::now_v7().to_string(), &root)
            .unwrap();
        assert!(lines.is_empty());
    }
}
