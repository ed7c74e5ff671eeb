use super::*;
use crate::{
    db::{
        record::{RecordAccessor, RecordReader},
        store::{Record, RecordId, StorePredicate},
    },
    test_support::{Note, NoteKey, Status, urn},
    traits::{
        BoolRepresentable, Date, DateRepresentable, Double, DoubleRepresentable, Flag, Int,
        Int16, Int16Representable, IntRepresentable, Text,
    },
    types::Timestamp,
    value::Value,
};
use proptest::prelude::*;
use std::{cmp::Ordering, time::SystemTime};

// ---------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------

#[test]
fn comparison_operators_render_natively() {
    let rendered: Vec<_> = [
        Comparison::Eq,
        Comparison::Gt,
        Comparison::Gte,
        Comparison::Lt,
        Comparison::Lte,
    ]
    .iter()
    .map(|c| c.operator())
    .collect();

    assert_eq!(rendered, ["=", ">", ">=", "<", "<="]);
}

#[test]
fn comparison_accepts_matching_orderings() {
    assert!(Comparison::Gte.accepts(Ordering::Equal));
    assert!(Comparison::Gte.accepts(Ordering::Greater));
    assert!(!Comparison::Gte.accepts(Ordering::Less));
    assert!(Comparison::Lte.accepts(Ordering::Less));
    assert!(!Comparison::Lt.accepts(Ordering::Equal));
    assert!(!Comparison::Eq.accepts(Ordering::Greater));
}

// ---------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------

#[test]
fn typed_constructors_pick_one_primitive() {
    let date = Timestamp::from_seconds(100);

    let cases: Vec<(QueryDescriptor<Note>, Value)> = vec![
        (
            QueryDescriptor::string(NoteKey::Title, Comparison::Eq, &"a".to_string()),
            Value::Text("a".into()),
        ),
        (
            QueryDescriptor::string(NoteKey::Status, Comparison::Eq, &Status::Published),
            Value::Text("published".into()),
        ),
        (
            QueryDescriptor::double(NoteKey::Rating, Comparison::Gt, &2.5),
            Value::Double(2.5),
        ),
        (
            QueryDescriptor::int(NoteKey::ViewCount, Comparison::Lt, &7_i32),
            Value::Int(7),
        ),
        (
            QueryDescriptor::int16(NoteKey::Priority, Comparison::Eq, &3_i16),
            Value::Int16(3),
        ),
        (
            QueryDescriptor::date(NoteKey::Date, Comparison::Gte, &date),
            Value::Timestamp(date),
        ),
        (QueryDescriptor::bool(NoteKey::Pinned, &true), Value::Bool(true)),
        (
            QueryDescriptor::urn(NoteKey::Urn, &urn("urn:note:1")),
            Value::Text("urn:note:1".into()),
        ),
    ];

    for (descriptor, expected) in cases {
        assert_eq!(descriptor.value(), &expected, "{descriptor:?}");
    }
}

#[test]
fn internal_value_uses_wire_names() {
    let descriptor = QueryDescriptor::<Note>::new(NoteKey::EditedAt, Comparison::Lt, 5_i64);

    assert_eq!(
        descriptor.internal_value(),
        ("editedAt", Comparison::Lt, &Value::Int(5))
    );
}

#[test]
fn compile_ands_in_list_order() {
    let descriptors = [
        QueryDescriptor::<Note>::equals(NoteKey::Title, "hello"),
        QueryDescriptor::<Note>::new(NoteKey::ViewCount, Comparison::Gte, 10_i64),
    ];
    let predicate = QueryDescriptor::compile(&descriptors);

    assert_eq!(predicate.clauses().len(), 2);
    assert_eq!(predicate.to_string(), r#"title = "hello" AND view_count >= 10"#);
}

#[test]
fn compile_of_nothing_matches_everything() {
    let predicate = QueryDescriptor::<Note>::compile(&[]);
    let record = Record::new(RecordId::new(1), "Note");

    assert!(predicate.is_empty());
    assert!(predicate.matches(&record));
}

#[test]
fn update_descriptor_distinguishes_null_from_value() {
    let set = UpdateDescriptor::<Note>::string(NoteKey::Body, &"text".to_string());
    let clear = UpdateDescriptor::<Note>::clear(NoteKey::Body);
    let from_none = UpdateDescriptor::<Note>::set_opt::<f64>(NoteKey::Rating, None);

    assert_eq!(set.internal_value(), ("body", Some(&Value::Text("text".into()))));
    assert_eq!(clear.internal_value(), ("body", None));
    assert_eq!(from_none.value(), None);
}

#[test]
fn update_descriptor_apply_sets_and_clears() {
    let mut record = Record::new(RecordId::new(1), "Note");
    record.set("body", Value::from("old"));
    record.set("title", Value::from("keep"));

    let mut accessor = crate::db::record::RecordAccessor::<Note>::new(&mut record);
    UpdateDescriptor::clear(NoteKey::Body).apply(&mut accessor);
    UpdateDescriptor::int16(NoteKey::Priority, &2_i16).apply(&mut accessor);

    assert_eq!(record.get("body"), None);
    assert_eq!(record.get("priority"), Some(&Value::Int16(2)));
    assert_eq!(record.get("title"), Some(&Value::from("keep")));
}

#[test]
fn sort_descriptor_maps_direction() {
    let asc = SortDescriptor::<Note>::ascending(NoteKey::Date).to_store_sort();
    let desc = SortDescriptor::<Note>::descending(NoteKey::EditedAt).to_store_sort();

    assert!(asc.ascending);
    assert_eq!(asc.field, "date");
    assert!(!desc.ascending);
    assert_eq!(desc.field, "editedAt");
    assert_eq!(Sorting::default(), Sorting::Ascending);
}

// ---------------------------------------------------------------------
// Custom representables
// ---------------------------------------------------------------------

///
/// Severity
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Severity {
    Low,
    High,
}

impl Int16Representable for Severity {
    fn int16_value(&self) -> i16 {
        match self {
            Self::Low => 1,
            Self::High => 9,
        }
    }

    fn from_int16_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(Self::Low),
            9 => Some(Self::High),
            _ => None,
        }
    }
}

///
/// Deadline
/// Only post-epoch instants are valid.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Deadline(Timestamp);

impl DateRepresentable for Deadline {
    fn date_value(&self) -> Timestamp {
        self.0
    }

    fn from_date_value(value: Timestamp) -> Option<Self> {
        (value.as_millis() >= 0).then_some(Self(value))
    }
}

///
/// Visibility
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Visibility {
    Shown,
    Hidden,
}

impl BoolRepresentable for Visibility {
    fn bool_value(&self) -> bool {
        matches!(self, Self::Shown)
    }

    fn from_bool_value(value: bool) -> Option<Self> {
        Some(if value { Self::Shown } else { Self::Hidden })
    }
}

///
/// Percent
///

#[derive(Clone, Copy, Debug, PartialEq)]
struct Percent(f64);

impl DoubleRepresentable for Percent {
    fn double_value(&self) -> f64 {
        self.0
    }

    fn from_double_value(value: f64) -> Option<Self> {
        (0.0..=100.0).contains(&value).then_some(Self(value))
    }
}

///
/// Views
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Views(u32);

impl IntRepresentable for Views {
    fn int_value(&self) -> i64 {
        i64::from(self.0)
    }

    fn from_int_value(value: i64) -> Option<Self> {
        u32::try_from(value).ok().map(Self)
    }
}

#[test]
fn unknown_custom_codes_read_as_none() {
    let mut record = Record::new(RecordId::new(1), "Note");
    record.set("priority", Value::Int16(42));
    record.set("editedAt", Value::Timestamp(Timestamp::from_seconds(-60)));
    record.set("rating", Value::Double(140.0));
    record.set("view_count", Value::Int(-3));
    let reader = RecordReader::<Note>::new(&record);

    assert_eq!(reader.int16(NoteKey::Priority), Some(42));
    assert_eq!(reader.int16_representable::<Severity>(NoteKey::Priority), None);
    assert_eq!(reader.date_representable::<Deadline>(NoteKey::EditedAt), None);
    assert_eq!(reader.double_representable::<Percent>(NoteKey::Rating), None);
    assert_eq!(reader.int_representable::<Views>(NoteKey::ViewCount), None);
}

#[test]
fn known_custom_codes_read_back() {
    let deadline = Deadline(Timestamp::from_seconds(3_600));
    let mut record = Record::new(RecordId::new(1), "Note");
    {
        let mut accessor = RecordAccessor::<Note>::new(&mut record);
        accessor
            .set_int16(NoteKey::Priority, &Severity::High)
            .set_date(NoteKey::EditedAt, &deadline)
            .set_double(NoteKey::Rating, &Percent(12.5))
            .set_int(NoteKey::ViewCount, &Views(7))
            .set_bool(NoteKey::Pinned, &Visibility::Hidden);
    }
    let reader = RecordReader::<Note>::new(&record);

    assert_eq!(reader.int16_representable(NoteKey::Priority), Some(Severity::High));
    assert_eq!(reader.date_representable(NoteKey::EditedAt), Some(deadline));
    assert_eq!(reader.double_representable(NoteKey::Rating), Some(Percent(12.5)));
    assert_eq!(reader.int_representable(NoteKey::ViewCount), Some(Views(7)));
    assert_eq!(reader.bool_representable(NoteKey::Pinned), Some(Visibility::Hidden));

    // a value of another primitive family is absent, not coerced
    assert_eq!(reader.int16_representable::<Severity>(NoteKey::ViewCount), None);
}

#[test]
fn capability_wrappers_pick_the_primitive() {
    let deadline = Deadline(Timestamp::from_seconds(100));

    let cases: Vec<(QueryDescriptor<Note>, Value)> = vec![
        (
            QueryDescriptor::new(NoteKey::Status, Comparison::Eq, Text(Status::Archived)),
            Value::Text("archived".into()),
        ),
        (
            QueryDescriptor::new(NoteKey::Rating, Comparison::Lt, Double(Percent(50.0))),
            Value::Double(50.0),
        ),
        (
            QueryDescriptor::new(NoteKey::ViewCount, Comparison::Gt, Int(Views(3))),
            Value::Int(3),
        ),
        (
            QueryDescriptor::new(NoteKey::Priority, Comparison::Eq, Int16(Severity::Low)),
            Value::Int16(1),
        ),
        (
            QueryDescriptor::new(NoteKey::Date, Comparison::Gte, Date(deadline)),
            Value::Timestamp(Timestamp::from_seconds(100)),
        ),
        (
            QueryDescriptor::new(NoteKey::Pinned, Comparison::Eq, Flag(Visibility::Shown)),
            Value::Bool(true),
        ),
    ];

    for (descriptor, expected) in cases {
        assert_eq!(descriptor.value(), &expected, "{descriptor:?}");
    }
}

#[test]
fn date_wrapper_clause_matches_records() {
    let descriptor = QueryDescriptor::<Note>::new(
        NoteKey::Date,
        Comparison::Gte,
        Date(Deadline(Timestamp::from_seconds(100))),
    );
    let predicate = QueryDescriptor::compile([&descriptor]);

    let mut later = Record::new(RecordId::new(1), "Note");
    later.set("date", Value::Timestamp(Timestamp::from_seconds(150)));
    let mut earlier = Record::new(RecordId::new(2), "Note");
    earlier.set("date", Value::Timestamp(Timestamp::from_seconds(50)));

    assert_eq!(
        predicate.clauses()[0].value,
        Value::Timestamp(Timestamp::from_seconds(100))
    );
    assert!(predicate.matches(&later));
    assert!(!predicate.matches(&earlier));
}

#[test]
fn flag_wrapper_update_stores_a_bool() {
    let update = UpdateDescriptor::<Note>::set(NoteKey::Pinned, Flag(Visibility::Hidden));
    let mut record = Record::new(RecordId::new(1), "Note");

    update.apply(&mut RecordAccessor::<Note>::new(&mut record));

    assert_eq!(update.value(), Some(&Value::Bool(false)));
    assert_eq!(record.get("pinned"), Some(&Value::Bool(false)));
}

#[test]
fn system_time_round_trips_on_both_sides_of_the_epoch() {
    let before = Timestamp::from_millis(-1_500);
    let after = Timestamp::from_millis(2_500);

    let past = SystemTime::from_date_value(before).expect("pre-epoch instant");
    let future = SystemTime::from_date_value(after).expect("post-epoch instant");

    assert_eq!(
        past,
        SystemTime::UNIX_EPOCH - std::time::Duration::from_millis(1_500)
    );
    assert_eq!(past.date_value(), before);
    assert_eq!(future.date_value(), after);
}

// ---------------------------------------------------------------------
// Builder state
// ---------------------------------------------------------------------

#[test]
fn query_overwrites_previous_predicate() {
    let session = crate::test_support::session();
    let request = session
        .fetch::<Note>()
        .query([QueryDescriptor::equals(NoteKey::Title, "first")])
        .query([QueryDescriptor::equals(NoteKey::Title, "second")])
        .request();

    let predicate = request.predicate.expect("predicate set");
    assert_eq!(predicate.clauses().len(), 1);
    assert_eq!(predicate.clauses()[0].value, Value::from("second"));
}

#[test]
fn builder_accumulates_sort_and_limit() {
    let session = crate::test_support::session();
    let request = session
        .fetch::<Note>()
        .filter(StorePredicate::default())
        .sort(SortDescriptor::descending(NoteKey::Date))
        .limit(5)
        .request();

    assert_eq!(request.entity, "Note");
    assert_eq!(request.limit, Some(5));
    assert_eq!(request.to_string(), "FETCH Note WHERE TRUEPREDICATE ORDER BY date DESC LIMIT 5");
}

#[test]
fn limit_one_forces_single_row_unless_strict() {
    let session = crate::test_support::session();

    let relaxed = session.fetch::<Note>().limit(10).limit_one().request();
    let strict = session.fetch::<Note>().limit(10).limit_one().strict().request();

    assert_eq!(relaxed.limit, Some(1));
    assert_eq!(strict.limit, None);
}

#[test]
fn latest_and_earliest_sort_opposite_ways() {
    let session = crate::test_support::session();

    let latest = session.fetch::<Note>().latest(NoteKey::Date).request();
    let earliest = session.fetch::<Note>().earliest(NoteKey::Date).request();

    assert_eq!(latest.sort.map(|s| s.ascending), Some(false));
    assert_eq!(earliest.sort.map(|s| s.ascending), Some(true));
}

// ---------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------

fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::option::of(0_i64..20),
        prop::option::of(-5.0_f64..5.0),
        prop::option::of(prop_oneof![Just("a"), Just("b"), Just("c")]),
    )
        .prop_map(|(views, rating, title)| {
            let mut record = Record::new(RecordId::new(1), "Note");
            if let Some(views) = views {
                record.set("view_count", Value::Int(views));
            }
            if let Some(rating) = rating {
                record.set("rating", Value::Double(rating));
            }
            if let Some(title) = title {
                record.set("title", Value::from(title));
            }
            record
        })
}

fn arb_comparison() -> impl Strategy<Value = Comparison> {
    prop_oneof![
        Just(Comparison::Eq),
        Just(Comparison::Gt),
        Just(Comparison::Gte),
        Just(Comparison::Lt),
        Just(Comparison::Lte),
    ]
}

fn arb_descriptor() -> impl Strategy<Value = QueryDescriptor<Note>> {
    prop_oneof![
        (arb_comparison(), 0_i64..20)
            .prop_map(|(c, v)| QueryDescriptor::<Note>::new(NoteKey::ViewCount, c, v)),
        (arb_comparison(), -5.0_f64..5.0)
            .prop_map(|(c, v)| QueryDescriptor::<Note>::new(NoteKey::Rating, c, v)),
        (arb_comparison(), prop_oneof![Just("a"), Just("b"), Just("c")])
            .prop_map(|(c, v)| QueryDescriptor::<Note>::new(NoteKey::Title, c, v)),
    ]
}

proptest! {
    #[test]
    fn conjunction_is_order_independent(
        descriptors in prop::collection::vec(arb_descriptor(), 0..5),
        records in prop::collection::vec(arb_record(), 0..10),
    ) {
        let forward = QueryDescriptor::compile(&descriptors);
        let reversed = QueryDescriptor::compile(descriptors.iter().rev());

        for record in &records {
            prop_assert_eq!(forward.matches(record), reversed.matches(record));
        }
    }

    #[test]
    fn conjunction_is_intersection_of_clauses(
        descriptors in prop::collection::vec(arb_descriptor(), 0..5),
        record in arb_record(),
    ) {
        let all = QueryDescriptor::compile(&descriptors).matches(&record);
        let each = descriptors.iter().all(|d| d.to_predicate().matches(&record));

        prop_assert_eq!(all, each);
    }
}
