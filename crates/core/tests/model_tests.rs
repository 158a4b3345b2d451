// ═══════════════════════════════════════════════════════════════════
// Model Tests — Metal, Holding, Portfolio, SpotQuote, FormDraft
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use stack_tracker_core::errors::CoreError;
use stack_tracker_core::models::draft::{DraftField, FormDraft};
use stack_tracker_core::models::holding::{Holding, HoldingId, Metal};
use stack_tracker_core::models::portfolio::Portfolio;
use stack_tracker_core::models::quote::{DailyChange, SpotQuote};
use stack_tracker_core::models::settings::{Settings, DEFAULT_API_BASE_URL};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Metal
// ═══════════════════════════════════════════════════════════════════

mod metal {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Metal::parse("silver"), Some(Metal::Silver));
        assert_eq!(Metal::parse(" GOLD "), Some(Metal::Gold));
        assert_eq!(Metal::parse("platinum"), None);
        assert_eq!(Metal::parse(""), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Metal::Silver).unwrap(), "\"silver\"");
        assert_eq!(serde_json::to_string(&Metal::Gold).unwrap(), "\"gold\"");
        let parsed: Metal = serde_json::from_str("\"gold\"").unwrap();
        assert_eq!(parsed, Metal::Gold);
    }

    #[test]
    fn display_matches_storage_name() {
        assert_eq!(Metal::Silver.to_string(), "silver");
        assert_eq!(Metal::Gold.to_string(), "gold");
    }

    #[test]
    fn all_lists_silver_first() {
        assert_eq!(Metal::ALL, [Metal::Silver, Metal::Gold]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Holding
// ═══════════════════════════════════════════════════════════════════

mod holding {
    use super::*;

    #[test]
    fn new_assigns_unique_ids() {
        let a = Holding::new(Metal::Silver, "Eagle", 1.0, 10, 32.0, date("2024-01-01"));
        let b = Holding::new(Metal::Silver, "Eagle", 1.0, 10, 32.0, date("2024-01-01"));
        assert!(!a.id.is_unassigned());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn lot_totals() {
        let h = Holding::new(Metal::Gold, "Buffalo", 0.1, 4, 280.0, date("2024-03-10"));
        assert!((h.total_ozt() - 0.4).abs() < 1e-12);
        assert_eq!(h.total_cost(), 1120.0);
        assert!((h.melt_value(2600.0) - 1040.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_with_legacy_field_names() {
        let h = Holding::new(Metal::Silver, "Eagle", 1.0, 10, 32.0, date("2024-01-01"))
            .with_dealer("APMEX");
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["metal"], "silver");
        assert_eq!(json["ozt"], 1.0);
        assert_eq!(json["quantity"], 10);
        assert_eq!(json["unitPrice"], 32.0);
        assert_eq!(json["dealer"], "APMEX");
        assert_eq!(json["date"], "2024-01-01");
        assert!(json.get("notes").is_none());
        assert!(json.get("oztPerUnit").is_none());
    }

    #[test]
    fn reads_records_written_by_earlier_versions() {
        let raw = r#"{
            "id": "1704067200000",
            "metal": "silver",
            "product": "Maple Leaf",
            "ozt": 1,
            "quantity": 20,
            "unitPrice": 31.5,
            "dealer": "",
            "date": "2024-01-01",
            "notes": ""
        }"#;
        let h: Holding = serde_json::from_str(raw).unwrap();
        assert_eq!(h.id, HoldingId::from("1704067200000"));
        assert_eq!(h.ozt_per_unit, 1.0);
        assert_eq!(h.quantity, 20);
        assert_eq!(h.dealer, None);
        assert_eq!(h.notes, None);
    }

    #[test]
    fn accepts_ozt_per_unit_alias() {
        let raw = r#"{"id":"a","metal":"gold","product":"Bar","oztPerUnit":0.5,
                      "quantity":2,"unitPrice":1300,"date":"2024-05-05"}"#;
        let h: Holding = serde_json::from_str(raw).unwrap();
        assert_eq!(h.ozt_per_unit, 0.5);
        assert_eq!(h.total_ozt(), 1.0);
    }

    #[test]
    fn rejects_bad_date() {
        let raw = r#"{"id":"a","metal":"gold","product":"Bar","ozt":1,
                      "quantity":1,"unitPrice":1,"date":"05/05/2024"}"#;
        assert!(serde_json::from_str::<Holding>(raw).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Portfolio
// ═══════════════════════════════════════════════════════════════════

mod portfolio {
    use super::*;

    #[test]
    fn partitions_by_metal() {
        let s = Holding::new(Metal::Silver, "Eagle", 1.0, 1, 30.0, date("2024-01-01"));
        let g = Holding::new(Metal::Gold, "Eagle", 1.0, 1, 2000.0, date("2024-01-01"));
        let portfolio = Portfolio {
            silver: vec![s.clone()],
            gold: vec![g.clone()],
        };

        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio.holdings(Metal::Silver), &[s.clone()]);
        assert_eq!(portfolio.find(&s.id, Metal::Silver), Some(&s));
        assert_eq!(portfolio.find(&s.id, Metal::Gold), None);
        assert_eq!(portfolio.metal_of(&g.id), Some(Metal::Gold));
        assert_eq!(portfolio.metal_of(&HoldingId::from("missing")), None);

        let ids: Vec<_> = portfolio.iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, vec![s.id, g.id]);
    }

    #[test]
    fn default_is_empty() {
        let portfolio = Portfolio::default();
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.len(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// SpotQuote
// ═══════════════════════════════════════════════════════════════════

mod spot_quote {
    use super::*;

    #[test]
    fn default_is_zero_placeholder() {
        let quote = SpotQuote::default();
        assert_eq!(quote.silver, 0.0);
        assert_eq!(quote.gold, 0.0);
        assert!(quote.is_placeholder());
        assert_eq!(quote.change.silver, DailyChange::default());
        assert!(!quote.change.gold.is_known());
    }

    #[test]
    fn price_per_metal() {
        let quote = SpotQuote::new(30.0, 2600.0);
        assert_eq!(quote.price(Metal::Silver), 30.0);
        assert_eq!(quote.price(Metal::Gold), 2600.0);
    }

    #[test]
    fn daily_change_known_only_with_both_parts() {
        assert!(DailyChange::new(Some(1.0), Some(0.5)).is_known());
        assert!(!DailyChange::new(Some(1.0), None).is_known());
        assert!(DailyChange::new(Some(0.0), Some(0.0)).is_known());
    }
}

// ═══════════════════════════════════════════════════════════════════
// FormDraft
// ═══════════════════════════════════════════════════════════════════

mod form_draft {
    use super::*;

    #[test]
    fn new_draft_defaults() {
        let draft = FormDraft::new_for(Metal::Silver, date("2024-06-01"));
        assert_eq!(draft.metal, Some(Metal::Silver));
        assert_eq!(draft.product, "");
        assert_eq!(draft.ozt_per_unit, Some(1.0));
        assert_eq!(draft.quantity, Some(1));
        assert_eq!(draft.unit_price, Some(0.0));
        assert_eq!(draft.date, Some(date("2024-06-01")));
        assert_eq!(draft.dealer, "");
        assert_eq!(draft.notes, "");
    }

    #[test]
    fn from_holding_copies_every_field() {
        let h = Holding::new(Metal::Gold, "Krugerrand", 1.0, 2, 2100.0, date("2023-11-11"))
            .with_dealer("JM Bullion")
            .with_notes("tube");
        let draft = FormDraft::from_holding(&h);
        let rebuilt = draft.to_holding(h.id.clone(), date("2024-01-01")).unwrap();
        assert_eq!(rebuilt, h);
    }

    #[test]
    fn empty_product_fails_validation() {
        let draft = FormDraft::new_for(Metal::Silver, date("2024-06-01"));
        let err = draft
            .to_holding(HoldingId::unassigned(), date("2024-06-01"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));

        let mut blank = draft.clone();
        blank.product = "   ".into();
        assert!(blank.to_holding(HoldingId::unassigned(), date("2024-06-01")).is_err());
    }

    #[test]
    fn unknown_metal_fails_validation() {
        let mut draft = FormDraft::new_for(Metal::Silver, date("2024-06-01"));
        draft.product = "Round".into();
        draft.apply(DraftField::Metal(None));
        let err = draft
            .to_holding(HoldingId::unassigned(), date("2024-06-01"))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn numeric_fallbacks_apply_at_commit() {
        let mut draft = FormDraft::new_for(Metal::Silver, date("2024-06-01"));
        draft.apply(DraftField::Product("Generic round".into()));
        draft.apply(DraftField::OztPerUnit(Some(f64::NAN)));
        draft.apply(DraftField::Quantity(Some(0)));
        draft.apply(DraftField::UnitPrice(None));
        draft.apply(DraftField::Date(None));

        let h = draft.to_holding(HoldingId::from("x"), date("2024-07-04")).unwrap();
        assert_eq!(h.ozt_per_unit, 1.0);
        assert_eq!(h.quantity, 1);
        assert_eq!(h.unit_price, 0.0);
        assert_eq!(h.date, date("2024-07-04"));
    }

    #[test]
    fn negative_values_fall_back() {
        let mut draft = FormDraft::new_for(Metal::Gold, date("2024-06-01"));
        draft.apply(DraftField::Product("Bar".into()));
        draft.apply(DraftField::OztPerUnit(Some(-1.0)));
        draft.apply(DraftField::UnitPrice(Some(-5.0)));
        let h = draft.to_holding(HoldingId::from("x"), date("2024-06-01")).unwrap();
        assert_eq!(h.ozt_per_unit, 1.0);
        assert_eq!(h.unit_price, 0.0);
    }

    #[test]
    fn text_fields_are_trimmed_and_blank_becomes_none() {
        let mut draft = FormDraft::new_for(Metal::Silver, date("2024-06-01"));
        draft.apply(DraftField::Product("  Eagle  ".into()));
        draft.apply(DraftField::Dealer("   ".into()));
        draft.apply(DraftField::Notes(" first buy ".into()));
        let h = draft.to_holding(HoldingId::from("x"), date("2024-06-01")).unwrap();
        assert_eq!(h.product, "Eagle");
        assert_eq!(h.dealer, None);
        assert_eq!(h.notes.as_deref(), Some("first buy"));
    }

    #[test]
    fn field_from_text_input() {
        assert_eq!(
            DraftField::from_input("quantity", "12").unwrap(),
            DraftField::Quantity(Some(12))
        );
        assert_eq!(
            DraftField::from_input("quantity", "abc").unwrap(),
            DraftField::Quantity(None)
        );
        assert_eq!(
            DraftField::from_input("ozt", "0.1").unwrap(),
            DraftField::OztPerUnit(Some(0.1))
        );
        assert_eq!(
            DraftField::from_input("unitPrice", "").unwrap(),
            DraftField::UnitPrice(None)
        );
        assert_eq!(
            DraftField::from_input("metal", "Gold").unwrap(),
            DraftField::Metal(Some(Metal::Gold))
        );
        assert_eq!(
            DraftField::from_input("date", "2024-02-29").unwrap(),
            DraftField::Date(Some(date("2024-02-29")))
        );
        assert_eq!(
            DraftField::from_input("date", "yesterday").unwrap(),
            DraftField::Date(None)
        );
    }

    #[test]
    fn unknown_field_name_is_rejected() {
        let err = DraftField::from_input("purity", "999").unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.metals_dev_api_key, None);
        assert_eq!(s.default_metal, Metal::Silver);
        assert_eq!(s.recent_holdings_limit, 5);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Settings = serde_json::from_str(r#"{"default_metal":"gold"}"#).unwrap();
        assert_eq!(s.default_metal, Metal::Gold);
        assert_eq!(s.recent_holdings_limit, 5);
        assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
    }
}
