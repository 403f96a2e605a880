use chrono::Utc;

use treasury::TaxLedger;
use vault_core::TaxEntryKind;
use vault_storage::{InvestmentStore, MemoryStore};

#[test]
fn test_report_breaks_down_by_source() {
    let store = MemoryStore::new();

    TaxLedger::collect(&store, TaxEntryKind::InstantSale, 460.0, "inv1", Utc::now()).unwrap();
    TaxLedger::collect(&store, TaxEntryKind::InstantSale, 230.0, "inv2", Utc::now()).unwrap();
    TaxLedger::collect(&store, TaxEntryKind::RewardClaim, 55.0, "inv3", Utc::now()).unwrap();
    TaxLedger::withdraw(&store, 145.0, "audit retainer", Utc::now()).unwrap();

    let report = TaxLedger::report(&store).unwrap();
    assert_eq!(report.collected_total, 745.0);
    assert_eq!(report.from_instant_sales, 690.0);
    assert_eq!(report.from_reward_claims, 55.0);
    assert_eq!(report.withdrawn_total, 145.0);
    assert_eq!(report.balance, 600.0);
    assert_eq!(report.entry_count, 4);
}

#[test]
fn test_ledger_entries_are_append_only() {
    let store = MemoryStore::new();

    TaxLedger::collect(&store, TaxEntryKind::RewardClaim, 10.0, "inv1", Utc::now()).unwrap();
    TaxLedger::collect(&store, TaxEntryKind::RewardClaim, 20.0, "inv1", Utc::now()).unwrap();

    let entries = store.tax_entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind == TaxEntryKind::RewardClaim));
    assert_ne!(entries[0].id, entries[1].id);
}
